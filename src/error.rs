//! Error types surfaced by the VLC link layer.

/// Errors returned by the send path, or used internally to classify a
/// dropped receive frame before it is logged and silently discarded.
///
/// Receive-path errors are never returned to callers (a corrupt frame is
/// indistinguishable from "no frame" at the netif boundary); they exist so
/// that the drop reason can be logged precisely.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum VlcError {
    /// The upper layer supplied a malformed packet: no link header, or an
    /// empty payload where one is required.
    #[error("malformed packet: missing link header or empty payload")]
    BadMessage,

    /// The outgoing frame would exceed `MTU + framing`.
    #[error("outgoing frame exceeds MTU + framing overhead")]
    MsgTooLarge,

    /// Timer or GPIO peripheral setup failed; the caller may retry.
    #[error("timer or hardware setup failed")]
    Transient,

    /// A requested option or configuration value is not accepted.
    #[error("unsupported option or configuration value")]
    Unsupported,

    /// The receive path found a CRC mismatch; the frame was dropped.
    #[error("CRC-8 mismatch on received frame")]
    CrcFailure,

    /// The receive path committed more bytes than the buffer can hold; the
    /// frame was dropped and the receiver reset.
    #[error("receive buffer overflow")]
    BufferOverflow,

    /// A synchronous operation exceeded its bounded wait: the receiver never
    /// saw a complete frame, or a send never observed completion.
    #[error("operation timed out")]
    Timeout,
}
