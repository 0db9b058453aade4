use crate::consts::REPLY_CAPACITY;

/// Reply bytes handed back by a card model for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandReply {
    buf: [u8; REPLY_CAPACITY],
    len: usize,
}

impl CommandReply {
    /// Creates a [`CommandReply`] from raw reply bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= REPLY_CAPACITY);

        let mut buf = [0; REPLY_CAPACITY];
        buf[..bytes.len()].copy_from_slice(bytes);

        CommandReply {
            buf,
            len: bytes.len(),
        }
    }

    /// Creates the ordinary four-byte reply carrying a 32-bit word
    /// (card status, or the OCR for READ_OCR), most significant byte first.
    pub fn word_reply(word: u32) -> Self {
        Self::from_slice(&word.to_be_bytes())
    }

    /// Count of valid reply bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the reply carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Valid reply bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// First four buffer bytes as a big-endian word.
    pub fn word(&self) -> u32 {
        u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]])
    }
}

/// Card model capability consumed by the protocol engine.
///
/// Command semantics, storage, addressing and CRC bookkeeping all live
/// behind this trait; the engine only frames bytes. A scripted
/// implementation makes the state machine testable without real card
/// semantics.
pub trait SdCardModel {
    /// Execute one command against the card.
    ///
    /// `None` means the card rejected the command or could not answer;
    /// the engine reports it on the bus as an illegal-command response.
    fn execute_command(&mut self, index: u8, argument: u32) -> Option<CommandReply>;

    /// Whether a data block is pending for the host to clock out.
    fn data_ready(&self) -> bool;

    /// Next pending data byte. Only called while [`data_ready`] holds;
    /// the model counts down the block, CRC trailer included.
    ///
    /// [`data_ready`]: SdCardModel::data_ready
    fn read_data_byte(&mut self) -> u8;
}
