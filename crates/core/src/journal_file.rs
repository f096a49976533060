//! On-disk journals: one JSON header line, then one line per input.
//!
//! Every input line carries a `link`, the xxh3 digest of the previous link and the
//! line's own `(seq, turn, input)`. The chain is anchored on the header, so a journal
//! cannot be re-pointed at another seed or config without breaking line 2. Lines are
//! flushed as they are written; a run that dies mid-write leaves at most one torn tail.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

use crate::journal::{InputJournal, InputPayload, InputRecord, JOURNAL_FORMAT_VERSION};

#[derive(Serialize, Deserialize)]
struct JournalHeader {
    format_version: u16,
    seed: u64,
    config_fingerprint: u64,
}

#[derive(Serialize, Deserialize)]
struct InputLine {
    seq: u64,
    /// Turn counter after the step that consumed this input.
    turn: u64,
    input: InputPayload,
    link: u64,
}

/// Where the chain stands: the link the next line must extend and the seq it must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainTip {
    link: u64,
    next_seq: u64,
    last_turn: u64,
}

impl ChainTip {
    fn anchored(header_json: &str) -> Self {
        Self { link: xxh3_64(header_json.as_bytes()), next_seq: 0, last_turn: 0 }
    }

    fn link_for(&self, turn: u64, input_json: &str) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&self.link.to_le_bytes());
        hasher.update(&self.next_seq.to_le_bytes());
        hasher.update(&turn.to_le_bytes());
        hasher.update(input_json.as_bytes());
        hasher.digest()
    }

    fn advance(&mut self, link: u64, turn: u64) {
        self.link = link;
        self.next_seq += 1;
        self.last_turn = turn;
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

/// Appends inputs to a journal file as they are accepted.
pub struct JournalWriter {
    out: BufWriter<File>,
    tip: ChainTip,
}

impl JournalWriter {
    /// Starts a fresh file for `journal`'s run. Inputs already in `journal` are not written.
    pub fn create(path: &Path, journal: &InputJournal) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let header = JournalHeader {
            format_version: journal.format_version,
            seed: journal.seed,
            config_fingerprint: journal.config_fingerprint,
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{header_json}")?;
        out.flush()?;
        Ok(Self { out, tip: ChainTip::anchored(&header_json) })
    }

    /// Keeps extending a file that loaded cleanly.
    pub fn resume(path: &Path, loaded: &LoadedJournal) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self { out: BufWriter::new(file), tip: loaded.tip.clone() })
    }

    pub fn append(&mut self, turn: u64, input: &InputPayload) -> io::Result<()> {
        let input_json = serde_json::to_string(input).map_err(io::Error::other)?;
        let link = self.tip.link_for(turn, &input_json);
        let line = InputLine { seq: self.tip.next_seq, turn, input: input.clone(), link };
        let line_json = serde_json::to_string(&line).map_err(io::Error::other)?;
        writeln!(self.out, "{line_json}")?;
        self.out.flush()?;
        self.tip.advance(link, turn);
        Ok(())
    }
}

/// Writes an in-memory journal in one go. It carries no turn numbers, so every line is
/// stamped with turn 0.
pub fn save_journal_to_file(path: &Path, journal: &InputJournal) -> io::Result<()> {
    let mut writer = JournalWriter::create(path, journal)?;
    for record in &journal.inputs {
        writer.append(0, &record.payload)?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    pub tip: ChainTip,
}

#[derive(Debug, Error)]
pub enum JournalLoadError {
    #[error("could not read journal: {0}")]
    Io(#[from] io::Error),
    #[error("journal has no header line")]
    MissingHeader,
    #[error("journal format {found} is not supported")]
    UnsupportedVersion { found: u16 },
    #[error("line {line} is not a valid journal {expected}: {source}")]
    Malformed {
        line: usize,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line} was cut off mid-write")]
    Truncated { line: usize },
    #[error("line {line} carries input #{found}, expected #{expected}")]
    OutOfOrder { line: usize, expected: u64, found: u64 },
    #[error("line {line} does not extend the checksum chain")]
    Tampered { line: usize },
    #[error("line {line} is stamped turn {found}, earlier than turn {previous}")]
    TurnWentBackwards { line: usize, previous: u64, found: u64 },
}

/// Reads and verifies a journal file. The first bad line aborts the load.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let mut lines = Lines::new(BufReader::new(File::open(path)?));

    let Some(header_json) = lines.next_line()? else {
        return Err(JournalLoadError::MissingHeader);
    };
    let header: JournalHeader = parse(&header_json, 1, "header")?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalLoadError::UnsupportedVersion { found: header.format_version });
    }
    let mut tip = ChainTip::anchored(&header_json);
    let mut journal = InputJournal {
        format_version: header.format_version,
        seed: header.seed,
        config_fingerprint: header.config_fingerprint,
        inputs: Vec::new(),
    };

    while let Some(text) = lines.next_line()? {
        let line = lines.number;
        let entry: InputLine = parse(&text, line, "input")?;
        if entry.seq != tip.next_seq {
            return Err(JournalLoadError::OutOfOrder { line, expected: tip.next_seq, found: entry.seq });
        }
        let input_json = serde_json::to_string(&entry.input)
            .map_err(|source| JournalLoadError::Malformed { line, expected: "input", source })?;
        if entry.link != tip.link_for(entry.turn, &input_json) {
            return Err(JournalLoadError::Tampered { line });
        }
        if entry.turn < tip.last_turn {
            return Err(JournalLoadError::TurnWentBackwards { line, previous: tip.last_turn, found: entry.turn });
        }
        tip.advance(entry.link, entry.turn);
        journal.inputs.push(InputRecord { seq: entry.seq, payload: entry.input });
    }

    Ok(LoadedJournal { journal, tip })
}

fn parse<'de, T: Deserialize<'de>>(
    text: &'de str,
    line: usize,
    expected: &'static str,
) -> Result<T, JournalLoadError> {
    serde_json::from_str(text).map_err(|source| JournalLoadError::Malformed { line, expected, source })
}

/// Newline-terminated lines with their 1-based numbers.
struct Lines<R> {
    reader: R,
    number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self { reader, number: 0 }
    }

    fn next_line(&mut self) -> Result<Option<String>, JournalLoadError> {
        let mut text = String::new();
        if self.reader.read_line(&mut text)? == 0 {
            return Ok(None);
        }
        self.number += 1;
        if text.pop() != Some('\n') {
            return Err(JournalLoadError::Truncated { line: self.number });
        }
        Ok(Some(text))
    }
}
