use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::combinations::Combination;
use crate::errors::{PermError, Result};
use crate::intervals::{IntervalSet, Span};
use crate::stats::Probability;

// The output is wrapped in a Result to allow matching on errors
// Returns an Iterator to the Reader of the lines of the file.
pub fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

fn parse_pos(field: &str, file: &Path, line: usize) -> Result<u64> {
    field.trim().parse::<u64>().map_err(|_| PermError::Parse {
        path: file.to_path_buf(),
        line,
        message: format!("invalid position '{}'", field),
    })
}

/// Numbered, non-blank, non-comment lines of a file
fn data_lines(file: &Path) -> Result<impl Iterator<Item = (usize, io::Result<String>)>> {
    Ok(read_lines(file)?
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| match l {
            Ok(s) => !(s.trim().is_empty() || s.starts_with('#')),
            Err(_) => true,
        }))
}

/// One path per line, in order
pub fn read_bed_list(file: &Path) -> Result<Vec<PathBuf>> {
    let mut ret = vec![];
    for (_, line) in data_lines(file)? {
        ret.push(PathBuf::from(line?.trim()));
    }
    Ok(ret)
}

pub fn read_bed(file: &Path, name: &str) -> Result<IntervalSet> {
    /*
    Read a three column bed file into a set. Overlapping records are merged.
    */
    info!("parsing {}", file.display());
    let mut spans: Vec<Span> = vec![];
    let mut tot_size: u64 = 0;

    for (num, line) in data_lines(file)? {
        let line = line?;
        let collection: Vec<&str> = line.split('\t').collect();
        if collection.len() < 3 {
            return Err(PermError::Parse {
                path: file.to_path_buf(),
                line: num,
                message: format!("malformed bed line: {}", line),
            });
        }
        let m_start = parse_pos(collection[1], file, num)?;
        let m_stop = parse_pos(collection[2], file, num)?;
        tot_size += m_stop.saturating_sub(m_start);
        spans.push(Span::new(collection[0], m_start, m_stop));
    }
    let num_records = spans.len();
    let ret = IntervalSet::from_spans(name, spans);
    if ret.is_empty() {
        warn!("{} has no intervals", file.display());
    }
    info!(
        "loaded {} intervals ({} after merging) on {} chromosomes",
        num_records,
        ret.len(),
        ret.chroms().len()
    );
    info!("total span: {}", tot_size);

    Ok(ret)
}

pub fn read_genome(file: &Path) -> Result<IntervalSet> {
    /*
    Read chromosome extents, either `chrom\tlength` or `chrom\tstart\tend`
    */
    info!("parsing {}", file.display());
    let mut spans: Vec<Span> = vec![];

    for (num, line) in data_lines(file)? {
        let line = line?;
        let collection: Vec<&str> = line.split('\t').collect();
        let span = match collection.len() {
            2 => Span::new(collection[0], 0, parse_pos(collection[1], file, num)?),
            n if n >= 3 => Span::new(
                collection[0],
                parse_pos(collection[1], file, num)?,
                parse_pos(collection[2], file, num)?,
            ),
            _ => {
                return Err(PermError::Parse {
                    path: file.to_path_buf(),
                    line: num,
                    message: format!("malformed genome line: {}", line),
                })
            }
        };
        spans.push(span);
    }
    let ret = IntervalSet::from_spans("genome", spans);
    info!("loaded {} chromosomes", ret.chroms().len());
    info!("total genome size: {}", ret.covered());

    Ok(ret)
}

/// Load every bed listed in `bed_list`, each named by its path
pub fn read_collection(bed_list: &Path) -> Result<Vec<IntervalSet>> {
    read_bed_list(bed_list)?
        .iter()
        .map(|p| read_bed(p, &p.to_string_lossy()))
        .collect()
}

/// Output sink; stdout when no path is given
pub fn writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

/// chrom, start, stop, #components, width, combination coverage, combination name
pub fn write_combinations<W: Write>(w: &mut W, combos: &[Combination]) -> Result<()> {
    for combo in combos {
        let covered = combo.set.covered();
        for span in combo.set.spans() {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                span.chrom,
                span.start,
                span.stop,
                combo.components.len(),
                span.width(),
                covered,
                combo.name()
            )?;
        }
    }
    Ok(())
}

/// count probability, coverage probability, combination name
pub fn write_probabilities<W: Write>(w: &mut W, probs: &[Probability]) -> Result<()> {
    for p in probs {
        writeln!(w, "{}\t{}\t{}", p.count_prob, p.covered_prob, p.name)?;
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut file, data)?;
    file.flush()?;
    Ok(())
}
