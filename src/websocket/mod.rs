//! WebSocket device ingestion
//!
//! The sensor device connects to `/` and pushes one JSON frame per message:
//!
//! ```text
//! {"ax": 0.12, "ay": -0.50, "az": 9.81}
//! ```
//!
//! Nothing is sent back. Text and binary messages are both treated as frames;
//! a close frame or transport error ends the session.
//!
//! ## Example
//!
//! ```python
//! # MicroPython on the device
//! ws = websocket.connect("ws://recorder.local:5000/")
//! ws.send(ujson.dumps({"ax": ax, "ay": ay, "az": az}))
//! ```

mod handler;

pub use handler::{device_socket_handler, WebSocketSource};
