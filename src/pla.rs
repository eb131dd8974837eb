//! PLA (Programmable Logic Array) file support
//!
//! Reads and writes the classical Espresso subset: `.i`, `.o`, `.p`,
//! `.ilb`, `.ob`, `.mv`, `.type` (accepted, ignored) and `.e`/`.end`.
//! Input cube characters are `0`, `1`, the don't-cares `-`, `~`, `2`, `3`,
//! and `4` which reads as 1; the output character set is the same.
//! Multi-valued variables declared by `.mv` are encoded one-hot within
//! their group, groups separated by `|` or whitespace.
//!
//! Parsing returns a typed [`PlaError`] carrying the offending 1-based line
//! number; no partial file is ever surfaced. A parsed [`PlaFile`] can be
//! turned into diagrams with [`DiagramManager::from_pla`], which builds one
//! BDD per output function as an OR of cube products.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Write};
use std::path::Path;

use crate::diagram::Diagram;
use crate::error::PlaError;
use crate::manager::DiagramManager;
use crate::ops::{BinOp, FoldType};
use crate::types::Value;

/// One position of a cube: a concrete value or a don't-care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeValue {
    Value(Value),
    DontCare,
}

/// One product line of a PLA file.
#[derive(Debug, Clone)]
pub struct PlaLine {
    /// One entry per input variable.
    pub inputs: Vec<CubeValue>,
    /// One entry per output function.
    pub outputs: Vec<CubeValue>,
}

/// An in-memory PLA file.
#[derive(Debug, Clone)]
pub struct PlaFile {
    domains: Vec<Value>,
    /// `Some(n)` when the file declared `.mv`: the first `n` variables are
    /// binary, the rest are one-hot groups.
    mv_binary_count: Option<usize>,
    output_count: usize,
    lines: Vec<PlaLine>,
    input_labels: Vec<String>,
    output_labels: Vec<String>,
}

impl PlaFile {
    /// Loads a PLA file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlaError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Parses a PLA file from a string.
    pub fn from_string(text: &str) -> Result<Self, PlaError> {
        Self::from_reader(Cursor::new(text.as_bytes()))
    }

    /// Parses a PLA file from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PlaError> {
        Parser::default().run(reader)
    }

    /// Number of input variables.
    pub fn input_count(&self) -> usize {
        self.domains.len()
    }

    /// Number of output functions.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Number of product lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[PlaLine] {
        &self.lines
    }

    /// Domain size per input variable; binary files are all 2s.
    pub fn domains(&self) -> &[Value] {
        &self.domains
    }

    /// True when every input variable is binary.
    pub fn is_binary(&self) -> bool {
        self.domains.iter().all(|&domain| domain == 2)
    }

    pub fn input_labels(&self) -> &[String] {
        &self.input_labels
    }

    pub fn output_labels(&self) -> &[String] {
        &self.output_labels
    }

    /// Writes the file back out in the classical format.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.mv_binary_count {
            None => writeln!(out, ".i {}", self.input_count())?,
            Some(binary_count) => {
                let groups: Vec<String> = self.domains[binary_count..]
                    .iter()
                    .map(|domain| domain.to_string())
                    .collect();
                writeln!(
                    out,
                    ".mv {} {} {}",
                    self.input_count(),
                    binary_count,
                    groups.join(" ")
                )?;
            }
        }
        writeln!(out, ".o {}", self.output_count)?;
        if !self.input_labels.is_empty() {
            writeln!(out, ".ilb {}", self.input_labels.join(" "))?;
        }
        if !self.output_labels.is_empty() {
            writeln!(out, ".ob {}", self.output_labels.join(" "))?;
        }
        writeln!(out, ".p {}", self.lines.len())?;

        let binary_count = self.mv_binary_count.unwrap_or(self.domains.len());
        for line in &self.lines {
            let mut text = String::new();
            for (position, (&value, &domain)) in
                line.inputs.iter().zip(&self.domains).enumerate()
            {
                if position < binary_count {
                    text.push(match value {
                        CubeValue::Value(0) => '0',
                        CubeValue::Value(_) => '1',
                        CubeValue::DontCare => '-',
                    });
                } else {
                    if !text.is_empty() {
                        text.push('|');
                    }
                    for k in 0..domain {
                        text.push(match value {
                            CubeValue::Value(v) if v == k => '1',
                            CubeValue::Value(_) => '0',
                            CubeValue::DontCare => '-',
                        });
                    }
                }
            }
            text.push(' ');
            for &value in &line.outputs {
                text.push(match value {
                    CubeValue::Value(0) => '0',
                    CubeValue::Value(_) => '1',
                    CubeValue::DontCare => '-',
                });
            }
            writeln!(out, "{text}")?;
        }
        writeln!(out, ".e")?;
        Ok(())
    }

    pub fn to_pla_string(&self) -> String {
        let mut buffer = Vec::new();
        self.write(&mut buffer).expect("writing to a Vec cannot fail");
        String::from_utf8(buffer).expect("PLA output is ASCII")
    }
}

#[derive(Default)]
struct Parser {
    input_count: Option<usize>,
    output_count: Option<usize>,
    /// From `.mv`: number of binary variables and the group domains.
    mv: Option<(usize, Vec<Value>)>,
    input_labels: Vec<String>,
    output_labels: Vec<String>,
    lines: Vec<PlaLine>,
}

impl Parser {
    fn run<R: BufRead>(mut self, reader: R) -> Result<PlaFile, PlaError> {
        for (number, text) in reader.lines().enumerate() {
            let number = number + 1;
            let text = text?;
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(directive) = trimmed.strip_prefix('.') {
                if directive == "e" || directive == "end" {
                    break;
                }
                self.directive(number, trimmed)?;
            } else {
                self.cube_line(number, trimmed)?;
            }
        }
        self.finish()
    }

    fn directive(&mut self, number: usize, text: &str) -> Result<(), PlaError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let parse_usize = |value: Option<&&str>| -> Result<usize, PlaError> {
            value
                .and_then(|token| token.parse().ok())
                .ok_or_else(|| PlaError::InvalidDirective {
                    line: number,
                    directive: tokens[0].to_string(),
                    value: value.map(|token| token.to_string()).unwrap_or_default(),
                })
        };

        match tokens[0] {
            ".i" => self.input_count = Some(parse_usize(tokens.get(1))?),
            ".o" => self.output_count = Some(parse_usize(tokens.get(1))?),
            ".p" => {
                parse_usize(tokens.get(1))?;
            }
            ".ilb" => {
                self.input_labels = tokens[1..].iter().map(|token| token.to_string()).collect();
            }
            ".ob" => {
                self.output_labels = tokens[1..].iter().map(|token| token.to_string()).collect();
            }
            ".mv" => {
                let var_count = parse_usize(tokens.get(1))?;
                let binary_count = parse_usize(tokens.get(2))?;
                let mut groups = Vec::new();
                for group in tokens.get(3..).unwrap_or(&[]) {
                    let size: Value =
                        group.parse().map_err(|_| PlaError::InvalidDirective {
                            line: number,
                            directive: ".mv".to_string(),
                            value: group.to_string(),
                        })?;
                    groups.push(size);
                }
                if binary_count + groups.len() != var_count {
                    return Err(PlaError::InvalidDirective {
                        line: number,
                        directive: ".mv".to_string(),
                        value: text.to_string(),
                    });
                }
                self.input_count = Some(var_count);
                self.mv = Some((binary_count, groups));
            }
            // .type and anything unrecognised is accepted and ignored.
            _ => {}
        }
        Ok(())
    }

    fn cube_line(&mut self, number: usize, text: &str) -> Result<(), PlaError> {
        let output_count = self.output_count.ok_or(PlaError::MissingDirective {
            directive: ".o",
        })?;

        if let Some((binary_count, groups)) = self.mv.clone() {
            self.mv_cube_line(number, text, binary_count, &groups, output_count)
        } else {
            let input_count = self.input_count.ok_or(PlaError::MissingDirective {
                directive: ".i",
            })?;
            self.binary_cube_line(number, text, input_count, output_count)
        }
    }

    fn binary_cube_line(
        &mut self,
        number: usize,
        text: &str,
        input_count: usize,
        output_count: usize,
    ) -> Result<(), PlaError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.chars().count() != input_count + output_count {
            return Err(PlaError::DimensionMismatch {
                line: number,
                expected: input_count + output_count,
                found: compact.chars().count(),
            });
        }

        let mut inputs = Vec::with_capacity(input_count);
        let mut outputs = Vec::with_capacity(output_count);
        for (position, character) in compact.chars().enumerate() {
            if position < input_count {
                inputs.push(cube_value(character).ok_or(PlaError::InvalidInputCharacter {
                    line: number,
                    position,
                    character,
                })?);
            } else {
                outputs.push(cube_value(character).ok_or(
                    PlaError::InvalidOutputCharacter {
                        line: number,
                        position: position - input_count,
                        character,
                    },
                )?);
            }
        }

        self.lines.push(PlaLine { inputs, outputs });
        Ok(())
    }

    fn mv_cube_line(
        &mut self,
        number: usize,
        text: &str,
        binary_count: usize,
        groups: &[Value],
        output_count: usize,
    ) -> Result<(), PlaError> {
        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == '|')
            .filter(|token| !token.is_empty())
            .collect();

        let expected_tokens = usize::from(binary_count > 0) + groups.len() + 1;
        if tokens.len() != expected_tokens {
            return Err(PlaError::DimensionMismatch {
                line: number,
                expected: expected_tokens,
                found: tokens.len(),
            });
        }

        let mut inputs = Vec::with_capacity(binary_count + groups.len());
        let mut token_index = 0;

        if binary_count > 0 {
            let binary = tokens[token_index];
            token_index += 1;
            if binary.chars().count() != binary_count {
                return Err(PlaError::DimensionMismatch {
                    line: number,
                    expected: binary_count,
                    found: binary.chars().count(),
                });
            }
            for (position, character) in binary.chars().enumerate() {
                inputs.push(cube_value(character).ok_or(
                    PlaError::InvalidInputCharacter {
                        line: number,
                        position,
                        character,
                    },
                )?);
            }
        }

        for (group, &domain) in groups.iter().enumerate() {
            let pattern = tokens[token_index];
            token_index += 1;
            if pattern.chars().count() != domain as usize {
                return Err(PlaError::InvalidGroup {
                    line: number,
                    group,
                });
            }
            let ones: Vec<usize> = pattern
                .chars()
                .enumerate()
                .filter(|&(_, c)| c == '1' || c == '4')
                .map(|(position, _)| position)
                .collect();
            let value = if ones.len() == 1 {
                CubeValue::Value(ones[0] as Value)
            } else if ones.is_empty() || ones.len() == domain as usize {
                // All don't-care or a full group both select everything.
                CubeValue::DontCare
            } else {
                return Err(PlaError::InvalidGroup {
                    line: number,
                    group,
                });
            };
            inputs.push(value);
        }

        let output_text = tokens[token_index];
        if output_text.chars().count() != output_count {
            return Err(PlaError::DimensionMismatch {
                line: number,
                expected: output_count,
                found: output_text.chars().count(),
            });
        }
        let mut outputs = Vec::with_capacity(output_count);
        for (position, character) in output_text.chars().enumerate() {
            outputs.push(cube_value(character).ok_or(
                PlaError::InvalidOutputCharacter {
                    line: number,
                    position,
                    character,
                },
            )?);
        }

        self.lines.push(PlaLine { inputs, outputs });
        Ok(())
    }

    fn finish(self) -> Result<PlaFile, PlaError> {
        let (domains, mv_binary_count) = match &self.mv {
            Some((binary_count, groups)) => {
                let mut domains = vec![2 as Value; *binary_count];
                domains.extend_from_slice(groups);
                (domains, Some(*binary_count))
            }
            None => {
                let input_count = self.input_count.ok_or(PlaError::MissingDirective {
                    directive: ".i",
                })?;
                (vec![2; input_count], None)
            }
        };
        let output_count = self.output_count.ok_or(PlaError::MissingDirective {
            directive: ".o",
        })?;

        if !self.input_labels.is_empty() && self.input_labels.len() != domains.len() {
            return Err(PlaError::LabelCountMismatch {
                kind: "input",
                expected: domains.len(),
                found: self.input_labels.len(),
            });
        }
        if !self.output_labels.is_empty() && self.output_labels.len() != output_count {
            return Err(PlaError::LabelCountMismatch {
                kind: "output",
                expected: output_count,
                found: self.output_labels.len(),
            });
        }

        let input_labels = if self.input_labels.is_empty() {
            (0..domains.len()).map(|i| format!("x{i}")).collect()
        } else {
            self.input_labels
        };
        let output_labels = if self.output_labels.is_empty() {
            (0..output_count).map(|i| format!("y{i}")).collect()
        } else {
            self.output_labels
        };

        Ok(PlaFile {
            domains,
            mv_binary_count,
            output_count,
            lines: self.lines,
            input_labels,
            output_labels,
        })
    }
}

fn cube_value(character: char) -> Option<CubeValue> {
    match character {
        '0' => Some(CubeValue::Value(0)),
        '1' | '4' => Some(CubeValue::Value(1)),
        '-' | '~' | '2' | '3' => Some(CubeValue::DontCare),
        _ => None,
    }
}

impl DiagramManager {
    /// Builds one BDD per output function: the OR over the products of the
    /// cubes that set that output, reduced with the chosen fold. A function
    /// with no cubes becomes the constant 0.
    pub fn from_pla(&self, file: &PlaFile, fold: FoldType) -> Vec<Diagram> {
        assert!(
            file.is_binary(),
            "diagrams can only be built from binary PLA files"
        );
        assert_eq!(
            self.var_count(),
            file.input_count(),
            "manager must have one variable per PLA input"
        );

        let mut functions = Vec::with_capacity(file.output_count());
        for fi in 0..file.output_count() {
            let mut products = Vec::new();
            for line in file.lines() {
                if line.outputs[fi] == CubeValue::Value(1) {
                    products.push(self.cube_product(&line.inputs));
                }
            }
            if products.is_empty() {
                products.push(self.constant(0));
            }
            functions.push(match fold {
                FoldType::Left => self.left_fold(BinOp::Or, &products),
                FoldType::Tree => self.tree_fold(BinOp::Or, &products),
            });
        }
        functions
    }

    fn cube_product(&self, inputs: &[CubeValue]) -> Diagram {
        let mut literals = Vec::new();
        for (index, &value) in inputs.iter().enumerate() {
            match value {
                CubeValue::Value(0) => literals.push(self.variable_not(index)),
                CubeValue::Value(_) => literals.push(self.variable(index)),
                CubeValue::DontCare => {}
            }
        }
        if literals.is_empty() {
            self.constant(1)
        } else {
            self.left_fold(BinOp::And, &literals)
        }
    }
}
