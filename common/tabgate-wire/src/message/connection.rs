use tabgate_api::message::Message;

/// A message received from the socket, decoded from one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecv(pub Message);

/// A message sent over the socket.  Enqueue order is emission order; the
/// connection's writer task is the stream's only writer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSend(pub Message);
