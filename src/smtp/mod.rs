//! Minimal SMTP listener acting as the mail trigger.
//!
//! Supports HELO/EHLO, MAIL FROM, RCPT TO, DATA, RSET, NOOP, QUIT. Each
//! accepted DATA payload is run through the pipeline; the reply reflects
//! whether processing succeeded.

use crate::{
    ingest::{Pipeline, RawMessage},
    store::EphemeralStore,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Upper bound for one DATA payload.
const MAX_MESSAGE_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Hello,
    MailFrom(String),
    RcptTo(String),
    Data,
    Reset,
    Noop,
    Quit,
    Unknown,
}

impl Command {
    fn parse(line: &str) -> Self {
        let upper = line.to_ascii_uppercase();
        if upper.starts_with("EHLO") || upper.starts_with("HELO") {
            Command::Hello
        } else if upper.starts_with("MAIL FROM:") {
            Command::MailFrom(path_arg(&line[10..]))
        } else if upper.starts_with("RCPT TO:") {
            Command::RcptTo(path_arg(&line[8..]))
        } else {
            match upper.as_str() {
                "DATA" => Command::Data,
                "RSET" => Command::Reset,
                "NOOP" => Command::Noop,
                "QUIT" => Command::Quit,
                _ => Command::Unknown,
            }
        }
    }
}

/// `<addr> [params]` -> `addr`.
fn path_arg(rest: &str) -> String {
    rest.split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(['<', '>'])
        .to_string()
}

/// Envelope collected between MAIL FROM and DATA.
#[derive(Default)]
struct Envelope {
    from: Option<String>,
    rcpts: Vec<String>,
}

/// Accept connections on `listener` forever.
pub async fn serve<S: EphemeralStore>(listener: TcpListener, pipeline: Pipeline<S>) -> Result<(), BoxError> {
    info!("smtp listener: {}", listener.local_addr()?);
    loop {
        let (stream, peer) = listener.accept().await?;
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(&pipeline, stream).await {
                warn!("smtp connection error from {}: {}", peer, e);
            }
        });
    }
}

async fn handle_client<S: EphemeralStore>(pipeline: &Pipeline<S>, stream: TcpStream) -> Result<(), BoxError> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    writer.write_all(b"220 verimail smtp\r\n").await?;
    writer.flush().await?;

    let mut envelope = Envelope::default();
    let mut buf = String::new();

    loop {
        buf.clear();
        if reader.read_line(&mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        debug!("smtp <= {}", line);

        let reply: &[u8] = match Command::parse(line) {
            Command::Hello => b"250-verimail\r\n250 OK\r\n",
            Command::MailFrom(from) => {
                envelope = Envelope {
                    from: Some(from),
                    rcpts: Vec::new(),
                };
                b"250 OK\r\n"
            }
            Command::RcptTo(_) if envelope.from.is_none() => b"503 Need MAIL command\r\n",
            Command::RcptTo(rcpt) => {
                envelope.rcpts.push(rcpt);
                b"250 Accepted\r\n"
            }
            Command::Data if envelope.rcpts.is_empty() => b"503 Need RCPT command\r\n",
            Command::Data => {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await?;
                let Some(data) = read_data(&mut reader).await? else {
                    writer.write_all(b"552 Message size exceeds limit\r\n").await?;
                    envelope = Envelope::default();
                    continue;
                };
                let env = std::mem::take(&mut envelope);
                let msg = RawMessage::from_data(env.from.unwrap_or_default(), env.rcpts, data);
                match pipeline.process(msg).await {
                    Ok(outcome) => {
                        debug!(?outcome, "message processed");
                        b"250 OK\r\n"
                    }
                    Err(e) => {
                        error!("message processing failed: {e}");
                        b"451 Requested action aborted: local error\r\n"
                    }
                }
            }
            Command::Reset => {
                envelope = Envelope::default();
                b"250 OK\r\n"
            }
            Command::Noop => b"250 OK\r\n",
            Command::Quit => {
                writer.write_all(b"221 Bye\r\n").await?;
                break;
            }
            Command::Unknown => b"502 Command not implemented\r\n",
        };
        writer.write_all(reply).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Read DATA lines up to the lone `.`, undoing dot-stuffing.
///
/// Returns `None` when the payload exceeds [`MAX_MESSAGE_BYTES`]; the rest of
/// the payload is still consumed so the session stays in sync.
async fn read_data<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut data = Vec::new();
    let mut oversized = false;
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line == b".\r\n" || line == b".\n" {
            break;
        }
        let payload = if line.starts_with(b"..") { &line[1..] } else { &line[..] };
        if data.len() + payload.len() > MAX_MESSAGE_BYTES {
            oversized = true;
            continue;
        }
        data.extend_from_slice(payload);
    }
    Ok((!oversized).then_some(data))
}
