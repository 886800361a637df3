//! Line-oriented checkpoint format.
//!
//! ```text
//! name:<population name>
//! generation:<n>
//! size:<individual count>
//! size:<gene count>        one block per chromosome
//! size:<locus count>       one block per gene
//! <locus value>            one per line
//! ```
//!
//! Locus values are written with Rust's shortest round-trip formatting, so a
//! restore reproduces them bit for bit.

use crate::engines::generation::{Chromosome, Gene};
use crate::error::{GaImageError, Result};
use crate::types::LocusMode;
use std::io::{BufRead, Lines, Write};

/// Upper bound on capacity reserved from a `size:` line before its
/// entries have actually been read
const MAX_PREALLOCATION: usize = 1024;

/// Parsed checkpoint contents, not yet bound to a configuration or scorer
#[derive(Debug)]
pub struct PopulationDump {
    pub name: String,
    pub generation: usize,
    pub individuals: Vec<Chromosome>,
}

pub fn write_gene<W: Write>(gene: &Gene, out: &mut W) -> Result<()> {
    writeln!(out, "size:{}", gene.len())?;
    for locus in gene.loci() {
        writeln!(out, "{}", locus)?;
    }
    Ok(())
}

pub fn write_chromosome<W: Write>(chromosome: &Chromosome, out: &mut W) -> Result<()> {
    writeln!(out, "size:{}", chromosome.len())?;
    for gene in chromosome.genes() {
        write_gene(gene, out)?;
    }
    Ok(())
}

pub fn write_population<'a, W, I>(
    name: &str,
    generation: usize,
    individuals: I,
    out: &mut W,
) -> Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = &'a Chromosome>,
{
    writeln!(out, "name:{}", name)?;
    writeln!(out, "generation:{}", generation)?;
    writeln!(out, "size:{}", individuals.len())?;
    for chromosome in individuals {
        write_chromosome(chromosome, out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn read_population<R: BufRead>(input: R, mode: LocusMode) -> Result<PopulationDump> {
    let mut reader = LineReader::new(input);

    let name = reader.expect_key("name")?;
    let generation = reader.expect_count("generation")?;
    let size = reader.expect_count("size")?;

    let mut individuals = Vec::with_capacity(size.min(MAX_PREALLOCATION));
    for _ in 0..size {
        individuals.push(read_chromosome(&mut reader, mode)?);
    }
    reader.expect_end()?;

    log::debug!(
        "Read checkpoint '{}' at generation {} with {} individuals",
        name,
        generation,
        individuals.len()
    );

    Ok(PopulationDump {
        name,
        generation,
        individuals,
    })
}

fn read_chromosome<R: BufRead>(reader: &mut LineReader<R>, mode: LocusMode) -> Result<Chromosome> {
    let size = reader.expect_count("size")?;
    let mut genes = Vec::with_capacity(size.min(MAX_PREALLOCATION));
    for _ in 0..size {
        genes.push(read_gene(reader, mode)?);
    }
    Ok(Chromosome::from_genes(genes))
}

fn read_gene<R: BufRead>(reader: &mut LineReader<R>, mode: LocusMode) -> Result<Gene> {
    let size = reader.expect_count("size")?;
    if size != mode.locus_count() {
        return Err(GaImageError::LocusCountMismatch {
            expected: mode.locus_count(),
            found: size,
        });
    }

    let mut loci = Vec::with_capacity(size);
    for _ in 0..size {
        loci.push(reader.expect_locus()?);
    }
    Gene::from_loci(loci, mode)
}

struct LineReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Result<String> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(line?)
            }
            None => Err(GaImageError::checkpoint(
                self.line_no + 1,
                "unexpected end of checkpoint",
            )),
        }
    }

    fn expect_key(&mut self, key: &str) -> Result<String> {
        let line = self.next_line()?;
        match line.split_once(':') {
            Some((k, v)) if k == key => Ok(v.to_string()),
            _ => Err(GaImageError::checkpoint(
                self.line_no,
                format!("expected `{}:<value>`, found {:?}", key, line),
            )),
        }
    }

    fn expect_count(&mut self, key: &str) -> Result<usize> {
        let value = self.expect_key(key)?;
        value.trim().parse::<usize>().map_err(|e| {
            GaImageError::checkpoint(self.line_no, format!("invalid {} {:?}: {}", key, value, e))
        })
    }

    fn expect_locus(&mut self) -> Result<f64> {
        let line = self.next_line()?;
        let value = line.trim().parse::<f64>().map_err(|e| {
            GaImageError::checkpoint(self.line_no, format!("invalid locus value {:?}: {}", line, e))
        })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(GaImageError::checkpoint(
                self.line_no,
                format!("locus value {} outside [0,1]", value),
            ));
        }
        Ok(value)
    }

    /// Only blank lines may follow the last chromosome
    fn expect_end(&mut self) -> Result<()> {
        while let Some(line) = self.lines.next() {
            self.line_no += 1;
            if !line?.trim().is_empty() {
                return Err(GaImageError::checkpoint(self.line_no, "unexpected trailing data"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn gene_text(values: &[&str]) -> String {
        let mut text = format!("size:{}\n", values.len());
        for v in values {
            text.push_str(v);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_gene_block_format() {
        let gene = Gene::from_loci(vec![0.0, 1.0, 0.5, 0.25, 0.125, 0.75, 0.1], LocusMode::Monochrome).unwrap();
        let mut out = Vec::new();
        write_gene(&gene, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "size:7\n0\n1\n0.5\n0.25\n0.125\n0.75\n0.1\n"
        );
    }

    #[test]
    fn test_read_population_keeps_values_exact() {
        let mut rng = StdRng::seed_from_u64(99);
        let individuals: Vec<Chromosome> = (0..3)
            .map(|_| Chromosome::random(4, LocusMode::Colored, &mut rng))
            .collect();

        let mut out = Vec::new();
        write_population("r", 12, individuals.iter(), &mut out).unwrap();
        let dump = read_population(Cursor::new(out), LocusMode::Colored).unwrap();

        assert_eq!(dump.name, "r");
        assert_eq!(dump.generation, 12);
        assert_eq!(dump.individuals.len(), 3);
        for (a, b) in individuals.iter().zip(&dump.individuals) {
            for (ga, gb) in a.genes().iter().zip(b.genes()) {
                let bits_a: Vec<u64> = ga.loci().iter().map(|v| v.to_bits()).collect();
                let bits_b: Vec<u64> = gb.loci().iter().map(|v| v.to_bits()).collect();
                assert_eq!(bits_a, bits_b);
            }
        }
    }

    #[test]
    fn test_locus_count_mismatch_is_fatal() {
        let text = format!(
            "name:\ngeneration:0\nsize:1\nsize:1\n{}",
            gene_text(&["0.1"; 7])
        );
        let result = read_population(Cursor::new(text), LocusMode::Colored);
        assert!(matches!(
            result,
            Err(GaImageError::LocusCountMismatch { expected: 10, found: 7 })
        ));
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let text = format!(
            "name:x\ngeneration:3\nsize:1\nsize:1\n{}",
            gene_text(&["0.1", "0.2", "oops", "0.4", "0.5", "0.6", "0.7"])
        );
        match read_population(Cursor::new(text), LocusMode::Monochrome) {
            Err(GaImageError::Checkpoint { line, .. }) => assert_eq!(line, 8),
            other => panic!("expected checkpoint error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let text = format!(
            "name:x\ngeneration:3\nsize:1\nsize:1\n{}",
            gene_text(&["0.1", "0.2", "0.3", "0.4", "0.5", "0.6", "1.5"])
        );
        assert!(matches!(
            read_population(Cursor::new(text), LocusMode::Monochrome),
            Err(GaImageError::Checkpoint { line: 12, .. })
        ));
    }

    #[test]
    fn test_truncated_stream() {
        let text = "name:x\ngeneration:3\nsize:2\nsize:0\n";
        assert!(matches!(
            read_population(Cursor::new(text), LocusMode::Monochrome),
            Err(GaImageError::Checkpoint { line: 5, .. })
        ));
    }

    #[test]
    fn test_huge_population_count_is_a_parse_error() {
        let text = "name:x\ngeneration:0\nsize:18446744073709551615\n";
        assert!(matches!(
            read_population(Cursor::new(text), LocusMode::Monochrome),
            Err(GaImageError::Checkpoint { line: 4, .. })
        ));
    }

    #[test]
    fn test_huge_gene_count_is_a_parse_error() {
        let text = "name:x\ngeneration:0\nsize:1\nsize:4000000000000000\n";
        assert!(matches!(
            read_population(Cursor::new(text), LocusMode::Monochrome),
            Err(GaImageError::Checkpoint { line: 5, .. })
        ));
    }

    #[test]
    fn test_wrong_key_order() {
        let text = "generation:3\nname:x\nsize:0\n";
        assert!(matches!(
            read_population(Cursor::new(text), LocusMode::Monochrome),
            Err(GaImageError::Checkpoint { line: 1, .. })
        ));
    }

    #[test]
    fn test_trailing_garbage_rejected_but_blank_lines_allowed() {
        let ok = "name:x\ngeneration:0\nsize:0\n\n\n";
        assert!(read_population(Cursor::new(ok), LocusMode::Monochrome).is_ok());

        let bad = "name:x\ngeneration:0\nsize:0\nsize:1\n";
        assert!(read_population(Cursor::new(bad), LocusMode::Monochrome).is_err());
    }
}
