//! Card-side SD/MMC SPI protocol engine written in Embedded Rust.
//!
//! This crate is the counterpart of a host-side SPI driver: it translates a
//! byte-serial bus stream into the command/response/data-block protocol of an
//! SD card operating in SPI mode, one byte in and one byte out per bus clock.
//! Command execution and block storage live behind the [`SdCardModel`] trait,
//! so the engine can front a real card model in an emulator or a scripted
//! double in tests.
//!
//! ## Features
//!
//! * `log` (default): log messages through the `log` facade.
//! * `defmt-log`: turn off the default features and enable this one to log
//!   messages over defmt instead.
//!
//! Make sure that either the `log` feature or the `defmt-log` feature is
//! enabled.

#![cfg_attr(not(test), no_std)]

mod card;
mod consts;
mod response;
mod status;

pub use crate::card::{CommandReply, SdCardModel};
pub use crate::consts::{commands, tokens, ARG_LEN, REPLY_CAPACITY, RESPONSE_CAPACITY};
pub use crate::response::R1Response;
pub use crate::status::{CardStatus, SpiStatus};

use crate::response::ResponseBuffer;

#[cfg(feature = "defmt-log")]
use defmt::{debug, warn};
#[cfg(feature = "log")]
use log::{debug, warn};

/// Protocol phase of the transfer session.
///
/// Exactly one phase is active at a time; transitions happen only while
/// processing an input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
enum TransferMode {
    AwaitingCommand,
    ReceivingArgument,
    SendingResponse,
    StartingDataBlock,
    StreamingDataBlock,
}

/// SPI-mode SD card target.
///
/// `Card` - card model implementation.
pub struct SdSpiTarget<Card: SdCardModel> {
    mode: TransferMode,
    command: u8,
    argument: [u8; ARG_LEN],
    argument_len: usize,
    response: ResponseBuffer,
    abort_pending: bool,
    card: Card,
}

impl<Card: SdCardModel> SdSpiTarget<Card> {
    /// Creates a new [`SdSpiTarget<Card>`] listening for its first command.
    ///
    /// `card` - card model, already initialized over its backing store.
    pub fn new(card: Card) -> Self {
        SdSpiTarget {
            mode: TransferMode::AwaitingCommand,
            command: 0,
            argument: [0; ARG_LEN],
            argument_len: 0,
            response: ResponseBuffer::new(),
            abort_pending: false,
            card,
        }
    }

    /// Borrow the card model.
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Borrow the card model mutably.
    pub fn card_mut(&mut self) -> &mut Card {
        &mut self.card
    }

    /// Tear the session down and hand the card model back.
    pub fn free(self) -> Card {
        self.card
    }

    /// Transfer one byte over the bus.
    ///
    /// Called once per bus clock: clocks `input` in and returns the byte the
    /// card drives out on the same clock. Never fails - card-level errors
    /// travel in-band as protocol bytes.
    pub fn transfer(&mut self, input: u8) -> u8 {
        // STOP_TRANSMISSION is the one command accepted while a block is
        // still being clocked out. The response to it must wait at least
        // one extra turnaround byte.
        if self.mode == TransferMode::StreamingDataBlock && input == commands::ABORT_FRAME {
            self.mode = TransferMode::AwaitingCommand;
            self.abort_pending = true;
        }

        match self.mode {
            TransferMode::AwaitingCommand => {
                if input == tokens::FILLER {
                    return tokens::FILLER;
                }

                self.command = input & commands::INDEX_MASK;
                self.argument_len = 0;
                self.mode = TransferMode::ReceivingArgument;
                tokens::FILLER
            }
            TransferMode::ReceivingArgument => {
                self.argument[self.argument_len] = input;
                self.argument_len += 1;

                if self.argument_len == ARG_LEN {
                    self.run_command();
                }

                tokens::FILLER
            }
            TransferMode::SendingResponse => {
                if self.abort_pending {
                    self.abort_pending = false;
                    return tokens::FILLER;
                }

                if let Some(byte) = self.response.next() {
                    return byte;
                }

                self.mode = if self.card.data_ready() {
                    TransferMode::StartingDataBlock
                } else {
                    TransferMode::AwaitingCommand
                };
                tokens::FILLER
            }
            TransferMode::StartingDataBlock => {
                self.mode = TransferMode::StreamingDataBlock;
                tokens::DATA_START_BLOCK
            }
            TransferMode::StreamingDataBlock => {
                let byte = self.card.read_data_byte();

                if !self.card.data_ready() {
                    self.mode = TransferMode::AwaitingCommand;
                }

                byte
            }
        }
    }

    /// Dispatch the assembled command to the card model and stage the
    /// response for the following bus clocks.
    fn run_command(&mut self) {
        let argument = u32::from_be_bytes(self.argument);

        debug!("CMD{} arg {:#x}", self.command, argument);

        match self.card.execute_command(self.command, argument) {
            None => {
                debug!("CMD{} rejected by card", self.command);
                self.response.load(&[R1Response::illegal().0]);
            }
            Some(reply) if self.command == commands::READ_OCR => {
                // R3: not-illegal R1 marker, then the OCR word verbatim.
                let mut r3 = [0x01; RESPONSE_CAPACITY];
                r3[1..].copy_from_slice(&reply.word().to_be_bytes());
                self.response.load(&r3);
            }
            Some(reply) if reply.len() != ARG_LEN => {
                warn!("unexpected {} byte reply to CMD{}", reply.len(), self.command);
                // Illegal command is about as near as we can get.
                self.response.load(&[R1Response::illegal().0]);
            }
            Some(reply) => {
                let status = SpiStatus::from(CardStatus(reply.word()));

                if self.command == commands::SEND_STATUS {
                    self.response.load(&[status.high_byte(), status.low_byte()]);
                } else {
                    self.response.load(&[status.high_byte()]);
                }
            }
        }

        self.mode = TransferMode::SendingResponse;
    }
}
