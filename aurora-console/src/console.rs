//! Line-oriented terminal I/O where every wait can be cut short by Ctrl+C.

use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

/// What a blocking read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Interrupted,
    /// End of input stream.
    Closed,
}

/// How a pacing wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Interrupted,
}

/// Ctrl+C presses queued since the console was built.
///
/// Presses are kept until a wait or an explicit check takes them, so one that
/// lands while nothing is awaiting still ends the next wait.
pub struct Interrupts {
    tx: mpsc::UnboundedSender<()>,
    rx: mpsc::UnboundedReceiver<()>,
}

impl Interrupts {
    /// A queue with no signal listener attached.
    pub fn manual() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Listen for Ctrl+C for as long as the runtime lives.
    ///
    /// Must be called from inside the runtime.
    #[cfg(unix)]
    pub fn from_ctrl_c() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        // Registered before returning so no press between here and the first poll is lost.
        let mut sigint = signal(SignalKind::interrupt()).context("failed to listen for Ctrl+C")?;
        let interrupts = Self::manual();
        let tx = interrupts.tx.clone();
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                log::debug!("ctrl+c received");
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Ok(interrupts)
    }

    /// Listen for Ctrl+C for as long as the runtime lives.
    #[cfg(not(unix))]
    pub fn from_ctrl_c() -> Result<Self> {
        let interrupts = Self::manual();
        let tx = interrupts.tx.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                log::debug!("ctrl+c received");
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        Ok(interrupts)
    }

    /// Take every queued press; `true` if there was at least one.
    fn take(&mut self) -> bool {
        let mut pressed = false;
        while self.rx.try_recv().is_ok() {
            pressed = true;
        }
        pressed
    }

    /// Resolve on the next press, swallowing any that queued behind it.
    async fn next(&mut self) {
        // `self.tx` keeps the channel open, so this only returns on a press.
        if self.rx.recv().await.is_some() {
            self.take();
        }
    }
}

/// Operator terminal: async line input, synchronous output.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
    interrupts: Interrupts,
    realtime: bool,
    clear_screen: bool,
}

impl<R: AsyncBufRead + Unpin, W: Write> Console<R, W> {
    pub fn new(reader: R, out: W, interrupts: Interrupts) -> Self {
        Self {
            lines: reader.lines(),
            out,
            interrupts,
            realtime: true,
            clear_screen: false,
        }
    }

    /// Skip every real-time wait.
    #[must_use]
    pub const fn instant(mut self, instant: bool) -> Self {
        self.realtime = !instant;
        self
    }

    /// Emit ANSI clear-screen sequences between menu screens.
    #[must_use]
    pub const fn clear_screen(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled;
        self
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    #[cfg(test)]
    pub fn press_ctrl_c(&self) {
        let _ = self.interrupts.tx.send(());
    }

    /// Another handle on the Ctrl+C queue, for pressing from a concurrent task.
    #[cfg(test)]
    pub fn ctrl_c_key(&self) -> mpsc::UnboundedSender<()> {
        self.interrupts.tx.clone()
    }

    /// Consume a pending Ctrl+C, for loops that never wait on input.
    pub fn interrupted(&mut self) -> bool {
        self.interrupts.take()
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "\x1b[H\x1b[J")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Print `text` without a newline and wait for one line of input.
    pub async fn prompt(&mut self, text: &str) -> Result<Input> {
        write!(self.out, "{text}")?;
        self.read_line().await
    }

    pub async fn read_line(&mut self) -> Result<Input> {
        self.out.flush().context("failed to flush console output")?;
        tokio::select! {
            biased;
            () = self.interrupts.next() => Ok(Input::Interrupted),
            line = self.lines.next_line() => {
                let line = line.context("failed to read console input")?;
                Ok(line.map_or(Input::Closed, |line| Input::Line(line.trim().to_string())))
            }
        }
    }

    /// Real-time pause; returns early on Ctrl+C, including one already pending.
    pub async fn sleep(&mut self, duration: Duration) -> Result<Wait> {
        self.out.flush().context("failed to flush console output")?;
        if self.interrupts.take() {
            return Ok(Wait::Interrupted);
        }
        if !self.realtime || duration.is_zero() {
            return Ok(Wait::Elapsed);
        }
        tokio::select! {
            biased;
            () = self.interrupts.next() => Ok(Wait::Interrupted),
            () = tokio::time::sleep(duration) => Ok(Wait::Elapsed),
        }
    }
}

/// Ctrl+C inside a test script.
#[cfg(test)]
pub const CTRL_C: char = '\u{3}';

/// In-memory keyboard. Each `CTRL_C` in the script is pressed as soon as
/// everything typed before it has been read.
#[cfg(test)]
pub struct Keystrokes {
    script: Vec<u8>,
    pos: usize,
    interrupts: mpsc::UnboundedSender<()>,
}

#[cfg(test)]
impl Keystrokes {
    fn new(script: &str, interrupts: mpsc::UnboundedSender<()>) -> Self {
        let mut keys = Self {
            script: script.as_bytes().to_vec(),
            pos: 0,
            interrupts,
        };
        keys.press_reached();
        keys
    }

    fn press_reached(&mut self) {
        while self.script.get(self.pos) == Some(&(CTRL_C as u8)) {
            self.pos += 1;
            let _ = self.interrupts.send(());
        }
    }

    fn typed(&self) -> &[u8] {
        let rest = &self.script[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == CTRL_C as u8)
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

#[cfg(test)]
impl tokio::io::AsyncRead for Keystrokes {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let n = this.typed().len().min(buf.remaining());
        buf.put_slice(&this.typed()[..n]);
        this.pos += n;
        this.press_reached();
        std::task::Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
impl AsyncBufRead for Keystrokes {
    fn poll_fill_buf(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::io::Result<&[u8]>> {
        std::task::Poll::Ready(Ok(self.get_mut().typed()))
    }

    fn consume(self: std::pin::Pin<&mut Self>, amt: usize) {
        let this = self.get_mut();
        this.pos += amt;
        this.press_reached();
    }
}

/// Build a console over an in-memory script with real-time waits disabled.
#[cfg(test)]
pub fn scripted(script: &str) -> Console<Keystrokes, Vec<u8>> {
    colored::control::set_override(false);
    let interrupts = Interrupts::manual();
    let keys = Keystrokes::new(script, interrupts.tx.clone());
    Console::new(keys, Vec::new(), interrupts).instant(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_trimmed_lines_then_reports_close() {
        let mut console = scripted("  first \nsecond\n");
        assert_eq!(
            console.prompt("> ").await.unwrap(),
            Input::Line("first".into())
        );
        assert_eq!(
            console.read_line().await.unwrap(),
            Input::Line("second".into())
        );
        assert_eq!(console.read_line().await.unwrap(), Input::Closed);
        assert_eq!(String::from_utf8(console.into_output()).unwrap(), "> ");
    }

    #[tokio::test]
    async fn instant_sleep_returns_immediately() {
        let mut console = scripted("");
        let started = std::time::Instant::now();
        let wait = console.sleep(Duration::from_secs(30)).await.unwrap();
        assert_eq!(wait, Wait::Elapsed);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn clear_screen_is_opt_in() {
        let mut console = scripted("");
        console.clear().unwrap();
        let mut console = Console::new(&b""[..], Vec::new(), Interrupts::manual()).clear_screen(true);
        console.clear().unwrap();
        assert_eq!(console.into_output(), b"\x1b[H\x1b[J");
    }

    #[tokio::test]
    async fn pending_ctrl_c_ends_the_next_read() {
        let mut console = scripted("typed ahead\n");
        console.press_ctrl_c();
        console.press_ctrl_c();
        assert_eq!(console.read_line().await.unwrap(), Input::Interrupted);
        // queued presses collapse into one
        assert_eq!(
            console.read_line().await.unwrap(),
            Input::Line("typed ahead".into())
        );
    }

    #[tokio::test]
    async fn ctrl_c_lands_after_the_line_before_it() {
        let mut console = scripted(&format!("first\n{CTRL_C}second\n"));
        assert!(!console.interrupted());
        assert_eq!(
            console.read_line().await.unwrap(),
            Input::Line("first".into())
        );
        assert!(console.interrupted());
        assert!(!console.interrupted());
        assert_eq!(
            console.read_line().await.unwrap(),
            Input::Line("second".into())
        );
    }

    #[tokio::test]
    async fn pending_ctrl_c_cuts_even_an_instant_sleep() {
        let mut console = scripted("");
        console.press_ctrl_c();
        assert_eq!(
            console.sleep(Duration::from_secs(30)).await.unwrap(),
            Wait::Interrupted
        );
        assert_eq!(console.sleep(Duration::ZERO).await.unwrap(), Wait::Elapsed);
    }

    #[tokio::test]
    async fn ctrl_c_wakes_a_real_time_sleep() {
        let mut console = scripted("").instant(false);
        let key = console.ctrl_c_key();
        let started = std::time::Instant::now();
        let press = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            key.send(()).unwrap();
        };
        let (wait, ()) = tokio::join!(console.sleep(Duration::from_secs(30)), press);
        assert_eq!(wait.unwrap(), Wait::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
