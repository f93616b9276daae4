//! External chord oracles.
//!
//! An oracle is a more rigorous classifier living outside this crate. It is
//! probed once; when present it is asked first, and any failure quietly
//! hands the chord back to the template engine.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::notes::MidiNote;
use crate::symbol::parse_symbol;
use crate::types::ChordQuality;

/// Confidence attached to any symbol an oracle returns.
pub const ORACLE_CONFIDENCE: f64 = 0.95;

/// Environment variable set while probing an oracle command.
pub const PROBE_ENV: &str = "CHORDIFY_ORACLE_PROBE";

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_millis(2000);

/// A chord symbol produced by an oracle, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleChord {
    pub symbol: String,
}

/// An oracle symbol the template vocabulary understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleAnswer {
    pub symbol: String,
    pub root_pitch_class: u8,
    pub quality: ChordQuality,
}

impl TryFrom<OracleChord> for OracleAnswer {
    type Error = OracleError;

    fn try_from(chord: OracleChord) -> Result<Self, OracleError> {
        let parsed = parse_symbol(&chord.symbol)
            .and_then(|p| p.quality.map(|quality| (p.root_pitch_class, quality)));
        match parsed {
            Some((root_pitch_class, quality)) => Ok(OracleAnswer {
                symbol: chord.symbol,
                root_pitch_class,
                quality,
            }),
            None => Err(OracleError::Unrecognized(chord.symbol)),
        }
    }
}

/// Oracle failures. Always absorbed by the caller, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle unavailable")]
    Unavailable,

    #[error("failed to start oracle: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("oracle i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle exited with {0}")]
    Status(std::process::ExitStatus),

    #[error("oracle returned no symbol")]
    EmptySymbol,

    /// Sentinels such as "Chord Symbol Cannot Be Identified" land here.
    #[error("oracle symbol {0:?} has no recognizable quality")]
    Unrecognized(String),
}

/// Capability-checked classifier consulted before the template engine.
pub trait ChordOracle: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this oracle can answer at all. Stable for the oracle's lifetime.
    fn is_available(&self) -> bool;

    fn classify(&self, notes: &[MidiNote]) -> Result<OracleChord, OracleError>;

    /// Fail-soft wrapper: every error, and every symbol without a known
    /// quality, becomes `None`.
    fn try_oracle(&self, notes: &[MidiNote]) -> Option<OracleAnswer> {
        if !self.is_available() {
            return None;
        }
        match self.classify(notes).and_then(OracleAnswer::try_from) {
            Ok(answer) => Some(answer),
            Err(e) => {
                debug!(oracle = self.name(), error = %e, "oracle failed, using heuristic");
                None
            }
        }
    }
}

/// No oracle: the template engine handles every chord.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicOnly;

impl ChordOracle for HeuristicOnly {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn classify(&self, _notes: &[MidiNote]) -> Result<OracleChord, OracleError> {
        Err(OracleError::Unavailable)
    }
}

/// An oracle backed by an external executable.
///
/// Protocol: the notes arrive on stdin as `{"midi_notes":[60,64,67]}` and a
/// newline; the first non-empty stdout line is the chord symbol. Probing
/// runs the command once with [`PROBE_ENV`] set and empty stdin; a
/// successful exit inside the timeout marks it available.
#[derive(Debug)]
pub struct CommandOracle {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
    available: OnceLock<bool>,
}

impl CommandOracle {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_ORACLE_TIMEOUT,
            available: OnceLock::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }

    fn probe(&self) -> bool {
        let mut cmd = self.command();
        cmd.env(PROBE_ENV, "1");
        let result = run_with_timeout(cmd, b"", self.timeout);
        let available = result.is_ok();
        match result {
            Ok(_) => info!(program = ?self.program, "chord oracle available"),
            Err(e) => info!(program = ?self.program, error = %e, "chord oracle unavailable"),
        }
        available
    }
}

impl ChordOracle for CommandOracle {
    fn name(&self) -> &'static str {
        "command"
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| self.probe())
    }

    fn classify(&self, notes: &[MidiNote]) -> Result<OracleChord, OracleError> {
        let request = serde_json::json!({ "midi_notes": notes });
        let mut input = request.to_string().into_bytes();
        input.push(b'\n');

        let output = run_with_timeout(self.command(), &input, self.timeout)?;
        let symbol = output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or(OracleError::EmptySymbol)?;

        Ok(OracleChord {
            symbol: normalize_symbol(symbol),
        })
    }
}

/// `"Cpower"` -> `"C5"`.
pub fn normalize_symbol(symbol: &str) -> String {
    match symbol.strip_suffix("power") {
        Some(root) => format!("{}5", root),
        None => symbol.to_string(),
    }
}

/// Run a command to completion, feeding `input` on stdin and collecting
/// stdout, killing it if `timeout` passes first.
fn run_with_timeout(mut cmd: Command, input: &[u8], timeout: Duration) -> Result<String, OracleError> {
    let deadline = Instant::now() + timeout;
    let mut child = cmd.spawn().map_err(OracleError::Spawn)?;

    if let Some(mut stdin) = child.stdin.take() {
        // A child that ignores stdin may already be gone.
        if let Err(e) = stdin.write_all(input) {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                kill(&mut child);
                return Err(e.into());
            }
        }
    }

    let Some(mut stdout) = child.stdout.take() else {
        kill(&mut child);
        return Err(OracleError::EmptySymbol);
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = String::new();
        let result = stdout.read_to_string(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });

    let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            kill(&mut child);
            return Err(e.into());
        }
        Err(_) => {
            kill(&mut child);
            return Err(OracleError::Timeout(timeout));
        }
    };

    loop {
        if let Some(status) = child.try_wait()? {
            if !status.success() {
                return Err(OracleError::Status(status));
            }
            return Ok(output);
        }
        if Instant::now() >= deadline {
            kill(&mut child);
            return Err(OracleError::Timeout(timeout));
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
