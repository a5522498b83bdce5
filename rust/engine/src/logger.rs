use serde::{Deserialize, Serialize};
use std::fmt;

/// A betting street in Texas Hold'em.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Street {
    /// Hole cards dealt, no board yet
    #[serde(rename = "Pre-Flop")]
    Preflop,
    /// Three community cards
    Flop,
    /// Fourth community card
    Turn,
    /// Fifth community card
    River,
}

impl Street {
    /// The street that follows this one, `None` after the river.
    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// Community cards dealt when this street begins.
    pub fn cards_dealt(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Street::Preflop => "Pre-Flop",
            Street::Flop => "Flop",
            Street::Turn => "Turn",
            Street::River => "River",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the table taken after a street's betting resolved.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StreetRecord {
    /// Sequence number of the hand this street belongs to
    pub hand: u32,
    /// The street that just finished
    pub round: Street,
    pub pot: u32,
    /// Community cards as display strings
    pub community_cards: Vec<String>,
    /// Chips each seated player put in during this street, in seating order
    pub player_bets: Vec<(String, u32)>,
    /// Balances after the street, in seating order
    pub player_balances: Vec<(String, u32)>,
    /// Timestamp when the record was taken (RFC3339)
    #[serde(default)]
    pub ts: Option<String>,
}

/// Append-only log of street records across every hand played at the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundLog {
    records: Vec<StreetRecord>,
}

pub const CSV_HEADER: &str = "round,pot,community_cards,player_bets,player_balances";

impl RoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, record: StreetRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[StreetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&StreetRecord> {
        self.records.last()
    }

    /// Writes one JSON object per line, LF terminated.
    pub fn write_jsonl<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        for record in &self.records {
            let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
        }
        w.flush()
    }

    /// Writes the tabular export: one row per street record.
    pub fn write_csv<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{}", CSV_HEADER)?;
        for r in &self.records {
            writeln!(
                w,
                "{},{},{},{},{}",
                csv_field(r.round.name()),
                r.pot,
                csv_field(&r.community_cards.join(", ")),
                csv_field(&join_amounts(&r.player_bets)),
                csv_field(&join_amounts(&r.player_balances)),
            )?;
        }
        w.flush()
    }
}

fn join_amounts(entries: &[(String, u32)]) -> String {
    entries
        .iter()
        .map(|(name, amount)| format!("{}: {}", name, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// File name for an exported log, e.g. `poker_game_log_20240131_184500.csv`.
pub fn log_file_name<Tz: chrono::TimeZone>(at: &chrono::DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("poker_game_log_{}.{}", at.format("%Y%m%d_%H%M%S"), extension)
}

/// Persists the log under `dir` as CSV (and JSONL when `with_jsonl`), returning the CSV path.
pub fn save_log(
    log: &RoundLog,
    dir: &std::path::Path,
    with_jsonl: bool,
) -> std::io::Result<std::path::PathBuf> {
    use std::fs::{create_dir_all, File};
    use std::io::BufWriter;

    if !dir.as_os_str().is_empty() {
        create_dir_all(dir)?;
    }
    let now = chrono::Local::now();
    let csv_path = dir.join(log_file_name(&now, "csv"));
    let mut csv = BufWriter::new(File::create(&csv_path)?);
    log.write_csv(&mut csv)?;
    if with_jsonl {
        let mut jsonl = BufWriter::new(File::create(dir.join(log_file_name(&now, "jsonl")))?);
        log.write_jsonl(&mut jsonl)?;
    }
    tracing::info!(path = %csv_path.display(), records = log.len(), "round log saved");
    Ok(csv_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StreetRecord {
        StreetRecord {
            hand: 1,
            round: Street::Flop,
            pot: 60,
            community_cards: vec!["A♠".into(), "7♦".into(), "2♣".into()],
            player_bets: vec![("Alice".into(), 20), ("Bob".into(), 20)],
            player_balances: vec![("Alice".into(), 970), ("Bob".into(), 970)],
            ts: None,
        }
    }

    #[test]
    fn csv_quotes_list_columns() {
        let mut log = RoundLog::new();
        log.append(record());
        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("Flop,60,\"A♠, 7♦, 2♣\",\"Alice: 20, Bob: 20\",\"Alice: 970, Bob: 970\"")
        );
    }

    #[test]
    fn jsonl_is_one_record_per_line() {
        let mut log = RoundLog::new();
        log.append(record());
        log.append(StreetRecord {
            round: Street::Preflop,
            ..record()
        });
        let mut out = Vec::new();
        log.write_jsonl(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"round\":\"Pre-Flop\""));
        let back: StreetRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn street_progression() {
        assert_eq!(Street::Preflop.next(), Some(Street::Flop));
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::Flop.cards_dealt(), 3);
    }

    #[test]
    fn file_name_uses_timestamp() {
        use chrono::TimeZone;
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 31, 18, 45, 0).unwrap();
        assert_eq!(log_file_name(&at, "csv"), "poker_game_log_20240131_184500.csv");
    }

    #[test]
    fn save_log_writes_csv_and_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs").join("table");
        let mut log = RoundLog::new();
        log.append(record());
        log.append(StreetRecord {
            round: Street::Turn,
            ..record()
        });

        let csv_path = save_log(&log, &target, true).unwrap();
        let name = csv_path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("poker_game_log_") && name.ends_with(".csv"), "{}", name);
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().count(), 3);

        let jsonl_path = csv_path.with_extension("jsonl");
        let jsonl = std::fs::read_to_string(&jsonl_path).unwrap();
        assert_eq!(jsonl.lines().count(), log.len());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 2);
    }

    #[test]
    fn save_log_without_jsonl_writes_only_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RoundLog::new();
        log.append(record());
        let csv_path = save_log(&log, dir.path(), false).unwrap();
        assert!(csv_path.exists());
        assert!(!csv_path.with_extension("jsonl").exists());
    }
}
