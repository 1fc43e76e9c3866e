use crate::{Result, TsError};

/// PAT PID (always 0x0000)
pub const PID_PAT: u16 = 0x0000;

/// NULL PID (always 0x1FFF)
pub const PID_NULL: u16 = 0x1FFF;

/// Transport Stream packet structure
#[derive(Debug, Clone)]
pub struct TsPacket {
    /// Sync byte (should always be 0x47)
    pub sync_byte: u8,
    /// Transport Error Indicator
    pub transport_error_indicator: bool,
    /// Payload Unit Start Indicator
    pub payload_unit_start_indicator: bool,
    /// Transport Priority
    pub transport_priority: bool,
    /// Packet Identifier
    pub pid: u16,
    /// Transport Scrambling Control
    pub transport_scrambling_control: u8,
    /// Adaptation Field Control
    pub adaptation_field_control: u8,
    /// Continuity Counter
    pub continuity_counter: u8,
    /// Adaptation field data (if present)
    pub adaptation_field: Option<Vec<u8>>,
    /// Payload data (if present)
    pub payload: Option<Vec<u8>>,
}

impl TsPacket {
    /// Parse a TS packet from 188 bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 188 {
            return Err(TsError::InvalidPacketSize(data.len()));
        }

        let sync_byte = data[0];
        if sync_byte != 0x47 {
            return Err(TsError::InvalidSyncByte(sync_byte));
        }

        let byte1 = data[1];
        let byte2 = data[2];
        let byte3 = data[3];

        let transport_error_indicator = (byte1 & 0x80) != 0;
        let payload_unit_start_indicator = (byte1 & 0x40) != 0;
        let transport_priority = (byte1 & 0x20) != 0;
        let pid = ((byte1 as u16 & 0x1F) << 8) | byte2 as u16;

        let transport_scrambling_control = (byte3 >> 6) & 0x03;
        let adaptation_field_control = (byte3 >> 4) & 0x03;
        let continuity_counter = byte3 & 0x0F;

        let mut offset = 4;
        let mut adaptation_field = None;
        let mut payload = None;

        // Parse adaptation field if present
        if adaptation_field_control == 0x02 || adaptation_field_control == 0x03 {
            if offset >= data.len() {
                return Err(TsError::InsufficientData {
                    expected: offset + 1,
                    actual: data.len(),
                });
            }

            let adaptation_field_length = data[offset] as usize;
            offset += 1;

            if adaptation_field_length > 0 {
                if offset + adaptation_field_length > data.len() {
                    return Err(TsError::InsufficientData {
                        expected: offset + adaptation_field_length,
                        actual: data.len(),
                    });
                }

                adaptation_field = Some(data[offset..offset + adaptation_field_length].to_vec());
                offset += adaptation_field_length;
            }
        }

        // Parse payload if present
        if (adaptation_field_control == 0x01 || adaptation_field_control == 0x03)
            && offset < data.len()
        {
            payload = Some(data[offset..].to_vec());
        }

        Ok(TsPacket {
            sync_byte,
            transport_error_indicator,
            payload_unit_start_indicator,
            transport_priority,
            pid,
            transport_scrambling_control,
            adaptation_field_control,
            continuity_counter,
            adaptation_field,
            payload,
        })
    }

    /// Check if this packet has a payload
    pub fn has_payload(&self) -> bool {
        self.adaptation_field_control == 0x01 || self.adaptation_field_control == 0x03
    }

    /// Check if this packet has an adaptation field
    pub fn has_adaptation_field(&self) -> bool {
        self.adaptation_field_control == 0x02 || self.adaptation_field_control == 0x03
    }

    /// Check if this packet contains a random access indicator
    pub fn has_random_access_indicator(&self) -> bool {
        if let Some(adaptation_field) = &self.adaptation_field {
            if !adaptation_field.is_empty() {
                // Random access indicator is bit 6 (0x40) of the first byte
                return (adaptation_field[0] & 0x40) != 0;
            }
        }
        false
    }

    /// Extracts the Program Clock Reference from the adaptation field, if
    /// the `PCR_flag` is set. Returned in 27 MHz units (`base * 300 +
    /// extension`), matching the wire encoding; divide by 300 to compare
    /// against a 90 kHz PTS/DTS clock.
    pub fn pcr(&self) -> Option<u64> {
        let adaptation_field = self.adaptation_field.as_ref()?;
        if adaptation_field.is_empty() {
            return None;
        }
        let flags = adaptation_field[0];
        let pcr_flag = (flags & 0x10) != 0;
        if !pcr_flag || adaptation_field.len() < 7 {
            return None;
        }
        let pcr_bytes = &adaptation_field[1..7];
        let base = ((pcr_bytes[0] as u64) << 25)
            | ((pcr_bytes[1] as u64) << 17)
            | ((pcr_bytes[2] as u64) << 9)
            | ((pcr_bytes[3] as u64) << 1)
            | ((pcr_bytes[4] as u64) >> 7);
        let extension = (((pcr_bytes[4] as u64) & 0x01) << 8) | (pcr_bytes[5] as u64);
        Some(base * 300 + extension)
    }

    /// Get the PSI payload (removes pointer field if PUSI is set)
    pub fn get_psi_payload(&self) -> Option<Vec<u8>> {
        if let Some(payload) = &self.payload {
            if self.payload_unit_start_indicator && !payload.is_empty() {
                // Skip pointer field
                let pointer_field = payload[0] as usize;
                if 1 + pointer_field < payload.len() {
                    return Some(payload[1 + pointer_field..].to_vec());
                }
            } else if !self.payload_unit_start_indicator {
                // Continuation packet, return payload as-is
                return Some(payload.clone());
            }
        }
        None
    }
}
