//! TLE ingestion: fetch, parse, and hand off whole batches

use std::sync::mpsc::Sender;
use std::thread;

use anyhow::{bail, Context, Result};

use super::{StationOptions, StationSeed};

/// Outcome of one background fetch, delivered as a single batch.
pub struct IngestResult {
    pub url: String,
    pub color: [f32; 3],
    pub options: StationOptions,
    pub outcome: Result<Vec<StationSeed>, String>,
}

/// Parse a TLE text file into station seeds.
///
/// Accepts both 3-line (name + elements) and bare 2-line records; element
/// sets satkit rejects are skipped rather than failing the batch.
pub fn parse_tle_stations(text: &str) -> Vec<StationSeed> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let mut seeds = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let (name, line1, line2, consumed) = if is_element_line(lines[i], '1') {
            if i + 1 >= lines.len() || !is_element_line(lines[i + 1], '2') {
                i += 1;
                continue;
            }
            (String::new(), lines[i], lines[i + 1], 2)
        } else if i + 2 < lines.len()
            && is_element_line(lines[i + 1], '1')
            && is_element_line(lines[i + 2], '2')
        {
            (lines[i].trim().to_string(), lines[i + 1], lines[i + 2], 3)
        } else {
            i += 1;
            continue;
        };

        match satkit::TLE::load_2line(line1, line2) {
            Ok(tle) => {
                let norad_id = tle.sat_num as u32;
                let name = if name.is_empty() {
                    format!("NORAD {}", norad_id)
                } else {
                    name
                };
                seeds.push(StationSeed {
                    name,
                    norad_id,
                    tle,
                });
            }
            Err(e) => log::trace!("skipping unparseable TLE record: {}", e),
        }

        i += consumed;
    }

    seeds
}

fn is_element_line(line: &str, digit: char) -> bool {
    line.starts_with(digit) && line.len() >= 69 && line.chars().nth(1) == Some(' ')
}

/// Blocking fetch + parse of one TLE group file.
pub fn fetch_stations(url: &str) -> Result<Vec<StationSeed>> {
    let body = ureq::get(url)
        .call()
        .with_context(|| format!("failed to fetch TLE file from {}", url))?
        .into_string()
        .context("failed to read TLE response body")?;

    let seeds = parse_tle_stations(&body);
    if seeds.is_empty() {
        bail!("no valid TLE records in {}", url);
    }

    log::info!("parsed {} stations from {}", seeds.len(), url);
    Ok(seeds)
}

/// Spawn a worker that fetches one group and sends the whole batch back.
///
/// The receiver side only ever sees complete batches; a dropped receiver
/// (engine disposed mid-flight) discards the result silently.
pub fn spawn_fetch(
    url: String,
    color: [f32; 3],
    options: StationOptions,
    sender: Sender<IngestResult>,
) {
    thread::spawn(move || {
        let outcome = fetch_stations(&url).map_err(|e| format!("{:#}", e));
        if let Err(ref msg) = outcome {
            log::warn!("ingestion failed for {}: {}", url, msg);
        }
        let _ = sender.send(IngestResult {
            url,
            color,
            options,
            outcome,
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_fixtures::{ISS_LINE1, ISS_LINE2};

    #[test]
    fn test_parse_named_records() {
        let text = format!("ISS (ZARYA)\n{}\n{}\n", ISS_LINE1, ISS_LINE2);
        let seeds = parse_tle_stations(&text);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].norad_id, 25544);
        assert_eq!(seeds[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn test_parse_bare_two_line_records() {
        let text = format!("{}\n{}\n", ISS_LINE1, ISS_LINE2);
        let seeds = parse_tle_stations(&text);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].name, "NORAD 25544");
    }

    #[test]
    fn test_garbage_lines_are_skipped() {
        let text = format!(
            "# comment\n\nISS (ZARYA)\n{}\n{}\nshort line\n",
            ISS_LINE1, ISS_LINE2
        );
        let seeds = parse_tle_stations(&text);
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_seeds() {
        assert!(parse_tle_stations("").is_empty());
        assert!(parse_tle_stations("just some text\nanother line\n").is_empty());
    }
}
