/// Count of argument bytes in a command frame.
pub const ARG_LEN: usize = 4;
/// Largest response the engine ever sends (R3: marker byte + OCR).
pub const RESPONSE_CAPACITY: usize = 5;
/// Largest reply a card model hands back for one command.
pub const REPLY_CAPACITY: usize = 16;

pub mod commands {
    /// Transmission marker present in every command frame byte.
    pub const CMD_BASE: u8 = 0x40;
    /// Low six bits of the frame byte carry the command index.
    pub const INDEX_MASK: u8 = 0x3F;
    /// Frame byte that aborts a block read in flight (STOP_TRANSMISSION
    /// as sent mid-stream). Compared raw against the wire, before the
    /// index mask.
    pub const ABORT_FRAME: u8 = 0x4D;
    /// SEND_STATUS - answered with the two-byte R2 status word.
    pub const SEND_STATUS: u8 = 13;
    /// READ_OCR - answered with the five-byte R3 response.
    pub const READ_OCR: u8 = 58;
}

pub mod tokens {
    /// Bus idle filler; also what the card drives while listening.
    pub const FILLER: u8 = 0xFF;
    /// Start data token preceding a streamed data block.
    pub const DATA_START_BLOCK: u8 = 0xFE;
}
