use crate::consts::RESPONSE_CAPACITY;

use bitfield::bitfield;

bitfield! {
    /// R1 response bitset.
    pub struct R1Response(u8);
    pub in_idle_state, set_in_idle_state: 0;
    pub erase_reset, set_erase_reset: 1;
    pub illegal_command, set_illegal_command: 2;
    pub command_crc_error, set_command_crc_error: 3;
    pub erase_sequence_error, set_erase_sequence_error: 4;
    pub address_error, set_address_error: 5;
    pub parameter_error, set_parameter_error: 6;
}

impl R1Response {
    /// The rejection response: only the illegal-command flag raised.
    ///
    /// Sent whenever the card model refuses a command or answers with an
    /// unusable reply shape.
    pub fn illegal() -> Self {
        let mut r1 = R1Response(0);
        r1.set_illegal_command(true);
        r1
    }
}

/// Outgoing response bytes for the command in flight.
///
/// Length and cursor are independent counters: the length is fixed when the
/// response is loaded, the cursor walks it one bus clock at a time.
pub struct ResponseBuffer {
    buf: [u8; RESPONSE_CAPACITY],
    len: usize,
    pos: usize,
}

impl ResponseBuffer {
    /// Creates an empty [`ResponseBuffer`].
    pub const fn new() -> Self {
        ResponseBuffer {
            buf: [0; RESPONSE_CAPACITY],
            len: 0,
            pos: 0,
        }
    }

    /// Load the response for a freshly dispatched command and rewind.
    pub fn load(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= RESPONSE_CAPACITY);

        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.len = bytes.len();
        self.pos = 0;
    }

    /// Next response byte to put on the bus, or `None` once delivered.
    pub fn next(&mut self) -> Option<u8> {
        if self.pos < self.len {
            let byte = self.buf[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            None
        }
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new()
    }
}
