//! Minimal STOMP 1.2 client over WebSocket.
//!
//! Only what the portal needs: CONNECT, SEND and DISCONNECT going out,
//! CONNECTED, ERROR and heart-beats coming in.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::domain::chat::ChatMessage;
use crate::messaging::{ChatPublisher, MessagingError};

const STOMP_VERSION: &str = "1.2";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Send,
    Message,
    Receipt,
    Error,
    Disconnect,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
            Command::Disconnect => "DISCONNECT",
        }
    }

    fn parse(value: &str) -> Result<Self, MessagingError> {
        match value {
            "CONNECT" | "STOMP" => Ok(Command::Connect),
            "CONNECTED" => Ok(Command::Connected),
            "SEND" => Ok(Command::Send),
            "MESSAGE" => Ok(Command::Message),
            "RECEIPT" => Ok(Command::Receipt),
            "ERROR" => Ok(Command::Error),
            "DISCONNECT" => Ok(Command::Disconnect),
            other => Err(MessagingError::Frame(format!("unknown command {other:?}"))),
        }
    }

    /// CONNECT and CONNECTED headers are never escaped.
    fn escapes_headers(self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of header `name`; repeated headers keep the first one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn connect(host: &str) -> Self {
        Frame::new(Command::Connect)
            .header("accept-version", STOMP_VERSION)
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    pub fn send(destination: &str, json: impl Into<String>) -> Self {
        let body = json.into();
        Frame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", body.len().to_string())
            .body(body)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decodes one frame. Leading end-of-line heart-beats are skipped.
    pub fn decode(raw: &str) -> Result<Self, MessagingError> {
        let raw = raw.trim_start_matches(['\r', '\n']);
        let (head, rest) = raw
            .split_once("\n\n")
            .or_else(|| raw.split_once("\r\n\r\n"))
            .ok_or_else(|| MessagingError::Frame("missing header terminator".to_string()))?;

        let mut lines = head.lines();
        let command = Command::parse(lines.next().unwrap_or_default().trim_end_matches('\r'))?;
        let escaped = command.escapes_headers();

        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| MessagingError::Frame(format!("malformed header {line:?}")))?;
            if escaped {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let frame = Frame {
            command,
            headers,
            body: String::new(),
        };

        let body = match frame.get("content-length").map(str::parse::<usize>) {
            Some(Ok(length)) => rest
                .get(..length)
                .ok_or_else(|| MessagingError::Frame("body shorter than content-length".to_string()))?,
            Some(Err(_)) => return Err(MessagingError::Frame("invalid content-length".to_string())),
            None => rest
                .split_once('\0')
                .map(|(body, _)| body)
                .ok_or_else(|| MessagingError::Frame("missing NUL terminator".to_string()))?,
        };

        Ok(frame.body(body))
    }
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String, MessagingError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(MessagingError::Frame(format!(
                    "invalid header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

/// Connection settings of the chat publisher.
#[derive(Clone, Debug)]
pub struct StompOptions {
    /// `ws://` or `wss://` endpoint of the broker.
    pub url: String,
    pub destination: String,
    /// Virtual host announced in CONNECT.
    pub host: String,
    pub reconnect_delay: Duration,
    /// When set, every SEND asks for a RECEIPT and is resent on the next
    /// session unless the receipt arrives within this delay.
    pub receipt_timeout: Option<Duration>,
}

impl StompOptions {
    pub fn new(url: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            host: "/".to_string(),
            reconnect_delay: Duration::from_secs(5),
            receipt_timeout: None,
        }
    }

    pub fn with_receipts(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = Some(timeout);
        self
    }
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Background STOMP publisher.
///
/// [`StompPublisher::start`] spawns a task on the current Tokio runtime that
/// owns the WebSocket, reconnecting after failures. Messages are queued on an
/// unbounded channel so publishing never blocks a request.
#[derive(Clone, Debug)]
pub struct StompPublisher {
    sender: UnboundedSender<String>,
}

impl StompPublisher {
    /// Must be called from within a Tokio runtime.
    pub fn start(options: StompOptions) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_publisher(options, receiver));
        Self { sender }
    }
}

impl ChatPublisher for StompPublisher {
    fn publish(&self, message: &ChatMessage) -> Result<(), MessagingError> {
        let body = serde_json::to_string(message).map_err(|e| MessagingError::Frame(e.to_string()))?;
        self.sender.send(body).map_err(|_| MessagingError::Closed)
    }
}

fn transport(err: impl Display) -> MessagingError {
    MessagingError::Transport(err.to_string())
}

fn closed_by_broker() -> MessagingError {
    MessagingError::Transport("connection closed by broker".to_string())
}

/// Decodes an inbound text message. Heart-beats yield `None`; an ERROR frame
/// ends the session.
fn inbound_frame(text: &str) -> Result<Option<Frame>, MessagingError> {
    if text.trim_matches(['\r', '\n']).is_empty() {
        return Ok(None);
    }
    let frame = Frame::decode(text)?;
    if frame.command == Command::Error {
        return Err(MessagingError::Broker(
            frame.get("message").unwrap_or(&frame.body).to_string(),
        ));
    }
    Ok(Some(frame))
}

async fn run_publisher(options: StompOptions, mut receiver: UnboundedReceiver<String>) {
    // Body taken off the queue but not yet known to have reached the broker.
    let mut unsent: Option<String> = None;

    loop {
        match open_session(&options).await {
            Ok(socket) => {
                log::info!("Connected to STOMP broker at {}", options.url);
                match pump(socket, &options, &mut receiver, &mut unsent).await {
                    Ok(()) => {
                        log::info!("Chat channel closed, STOMP publisher stopped");
                        return;
                    }
                    Err(err) => log::error!("STOMP session dropped: {err}"),
                }
            }
            Err(err) => log::error!("Failed to connect to STOMP broker: {err}"),
        }
        tokio::time::sleep(options.reconnect_delay).await;
    }
}

async fn open_session(options: &StompOptions) -> Result<Socket, MessagingError> {
    let (mut socket, _) = connect_async(options.url.as_str()).await.map_err(transport)?;

    socket
        .send(Message::Text(Frame::connect(&options.host).encode()))
        .await
        .map_err(transport)?;

    while let Some(incoming) = socket.next().await {
        let text = match incoming.map_err(transport)? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Some(frame) = inbound_frame(&text)? else {
            continue;
        };
        return match frame.command {
            Command::Connected => Ok(socket),
            other => Err(MessagingError::Frame(format!("expected CONNECTED, got {other}"))),
        };
    }

    Err(MessagingError::Transport(
        "connection closed during handshake".to_string(),
    ))
}

async fn pump(
    mut socket: Socket,
    options: &StompOptions,
    receiver: &mut UnboundedReceiver<String>,
    unsent: &mut Option<String>,
) -> Result<(), MessagingError> {
    let mut sequence: u64 = 0;

    loop {
        let body = match unsent.take() {
            Some(body) => body,
            None => match next_queued(&mut socket, receiver).await? {
                Some(body) => body,
                None => {
                    let _ = socket.send(Message::Text(Frame::disconnect().encode())).await;
                    let _ = socket.close(None).await;
                    return Ok(());
                }
            },
        };

        sequence += 1;
        let body = unsent.insert(body);
        deliver(&mut socket, options, body, sequence).await?;
        *unsent = None;
    }
}

/// Waits for the next queued body while watching the socket for ERROR or
/// close. `None` means the channel was closed.
async fn next_queued(
    socket: &mut Socket,
    receiver: &mut UnboundedReceiver<String>,
) -> Result<Option<String>, MessagingError> {
    loop {
        tokio::select! {
            queued = receiver.recv() => return Ok(queued),
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(frame) = inbound_frame(&text)? {
                        log::debug!("Ignoring inbound {} frame", frame.command);
                    }
                }
                Some(Ok(Message::Close(_))) | None => return Err(closed_by_broker()),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(transport(err)),
            },
        }
    }
}

async fn deliver(
    socket: &mut Socket,
    options: &StompOptions,
    body: &str,
    sequence: u64,
) -> Result<(), MessagingError> {
    let frame = Frame::send(&options.destination, body);
    let Some(timeout) = options.receipt_timeout else {
        return socket.send(Message::Text(frame.encode())).await.map_err(transport);
    };

    let receipt_id = format!("chat-{sequence}");
    let frame = frame.header("receipt", receipt_id.as_str());
    socket.send(Message::Text(frame.encode())).await.map_err(transport)?;

    tokio::time::timeout(timeout, await_receipt(socket, &receipt_id))
        .await
        .map_err(|_| MessagingError::Transport(format!("no RECEIPT for {receipt_id}")))?
}

async fn await_receipt(socket: &mut Socket, receipt_id: &str) -> Result<(), MessagingError> {
    while let Some(incoming) = socket.next().await {
        let text = match incoming.map_err(transport)? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match inbound_frame(&text)? {
            Some(frame)
                if frame.command == Command::Receipt
                    && frame.get("receipt-id") == Some(receipt_id) =>
            {
                return Ok(());
            }
            Some(frame) => log::debug!("Ignoring inbound {} frame", frame.command),
            None => {}
        }
    }
    Err(closed_by_broker())
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use super::*;
    use crate::domain::types::{ChatText, UserId};

    #[test]
    fn send_frame_layout() {
        let frame = Frame::send("/app/chat", r#"{"a":1}"#);
        assert_eq!(
            frame.encode(),
            "SEND\ndestination:/app/chat\ncontent-type:application/json\ncontent-length:7\n\n{\"a\":1}\0"
        );
    }

    #[test]
    fn headers_are_escaped_except_on_connect() {
        let frame = Frame::new(Command::Send).header("x", "a:b\nc\\");
        assert!(frame.encode().contains("x:a\\cb\\nc\\\\\n"));

        let connect = Frame::new(Command::Connect).header("host", "a:b");
        assert!(connect.encode().contains("host:a:b\n"));
    }

    #[test]
    fn decode_round_trips_escaped_headers() {
        let frame = Frame::new(Command::Message)
            .header("subscription", "sub:0")
            .body("hello");
        assert_eq!(Frame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn decode_skips_heart_beats_and_honours_content_length() {
        let frame = Frame::decode("\n\nMESSAGE\ncontent-length:3\n\na\0b\0").unwrap();
        assert_eq!(frame.command, Command::Message);
        assert_eq!(frame.body, "a\0b");
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert!(Frame::decode("SEND\ndestination:/x\n\nbody").is_err());
        assert!(Frame::decode("BOGUS\n\n\0").is_err());
        assert!(Frame::decode("SEND\nbad\\x:1\n\n\0").is_err());
    }

    async fn next_frame(socket: &mut WebSocketStream<TcpStream>) -> Frame {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Frame::decode(&text).unwrap(),
                Some(Ok(_)) => continue,
                other => panic!("unexpected websocket event: {other:?}"),
            }
        }
    }

    /// Accepts one session, reads its CONNECT and answers with `reply`.
    async fn accept_session(listener: &TcpListener, reply: Frame) -> WebSocketStream<TcpStream> {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();

        let connect = next_frame(&mut socket).await;
        assert_eq!(connect.command, Command::Connect);
        assert_eq!(connect.get("accept-version"), Some("1.2"));

        socket.send(Message::Text(reply.encode())).await.unwrap();
        socket
    }

    fn connected() -> Frame {
        Frame::new(Command::Connected).header("version", "1.2")
    }

    fn receipt_for(send: &Frame) -> Frame {
        let id = send.get("receipt").unwrap().to_string();
        Frame::new(Command::Receipt).header("receipt-id", id)
    }

    fn options(url: String) -> StompOptions {
        StompOptions {
            reconnect_delay: Duration::from_millis(20),
            ..StompOptions::new(url, "/app/chat")
        }
    }

    fn hello() -> ChatMessage {
        ChatMessage::outgoing(
            UserId::new(1).unwrap(),
            UserId::new(2).unwrap(),
            ChatText::new("Hi").unwrap(),
        )
    }

    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    async fn within<T>(task: tokio::task::JoinHandle<T>) -> T {
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("broker finished in time")
            .unwrap()
    }

    #[tokio::test]
    async fn publisher_sends_after_connected() {
        let (listener, url) = bind().await;

        let broker = tokio::spawn(async move {
            let mut socket = accept_session(&listener, connected()).await;
            next_frame(&mut socket).await
        });

        let publisher = StompPublisher::start(StompOptions::new(url, "/app/chat"));
        publisher.publish(&hello()).unwrap();

        let frame = within(broker).await;

        assert_eq!(frame.command, Command::Send);
        assert_eq!(frame.get("destination"), Some("/app/chat"));
        assert_eq!(frame.get("receipt"), None);
        let body: serde_json::Value = serde_json::from_str(&frame.body).unwrap();
        assert_eq!(body["senderId"], 1);
        assert_eq!(body["receiverId"], 2);
        assert_eq!(body["message"], "Hi");
        assert_eq!(body["status"], "SENT");
    }

    #[tokio::test]
    async fn queued_message_survives_a_dropped_handshake() {
        let (listener, url) = bind().await;

        let broker = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut first = accept_async(stream).await.unwrap();
            assert_eq!(next_frame(&mut first).await.command, Command::Connect);
            drop(first);

            let mut second = accept_session(&listener, connected()).await;
            next_frame(&mut second).await
        });

        let publisher = StompPublisher::start(options(url));
        publisher.publish(&hello()).unwrap();

        let frame = within(broker).await;
        assert_eq!(frame.command, Command::Send);
        assert!(frame.body.contains("\"message\":\"Hi\""));
    }

    #[tokio::test]
    async fn broker_error_triggers_reconnect() {
        let (listener, url) = bind().await;

        let broker = tokio::spawn(async move {
            let mut first = accept_session(&listener, connected()).await;
            let error = Frame::new(Command::Error).header("message", "session expired");
            first.send(Message::Text(error.encode())).await.unwrap();

            let mut second = accept_session(&listener, connected()).await;
            let send = next_frame(&mut second).await;
            second
                .send(Message::Text(receipt_for(&send).encode()))
                .await
                .unwrap();
            drop(first);
            send
        });

        let publisher =
            StompPublisher::start(options(url).with_receipts(Duration::from_secs(2)));
        publisher.publish(&hello()).unwrap();

        let frame = within(broker).await;
        assert_eq!(frame.command, Command::Send);
        assert!(frame.get("receipt").is_some());
        assert!(frame.body.contains("\"message\":\"Hi\""));
    }

    #[tokio::test]
    async fn unacknowledged_send_is_resent_on_next_session() {
        let (listener, url) = bind().await;

        let broker = tokio::spawn(async move {
            let mut first = accept_session(&listener, connected()).await;
            let lost = next_frame(&mut first).await;
            drop(first);

            let mut second = accept_session(&listener, connected()).await;
            let resent = next_frame(&mut second).await;
            second
                .send(Message::Text(receipt_for(&resent).encode()))
                .await
                .unwrap();
            (lost, resent)
        });

        let publisher =
            StompPublisher::start(options(url).with_receipts(Duration::from_secs(2)));
        publisher.publish(&hello()).unwrap();

        let (lost, resent) = within(broker).await;
        assert_eq!(lost.command, Command::Send);
        assert_eq!(resent.command, Command::Send);
        assert_eq!(resent.body, lost.body);
    }
}
