use std::io::{self, BufRead};
use tokio::sync::mpsc;

/// Read lines from `reader` on a dedicated thread.
///
/// The receiver closes at end of input. The thread is detached, so a read
/// that is still blocked never holds up shutdown.
pub fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::UnboundedReceiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("webterm-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}
