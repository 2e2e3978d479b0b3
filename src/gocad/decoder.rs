//! Line-oriented GOCAD ASCII decoder.
//!
//! One pass over the text, one line at a time. Scratch state accumulates
//! positions, faces and attribute values of the object in progress; a
//! separator, a new `GOCAD` header or the end of input turns it into a
//! [`Table`].

use crate::core::{Table, UserData, INDICES, POSITIONS};
use crate::gocad::layout::AttributeLayout;
use crate::gocad::policy::{float_series, index_series};
use crate::gocad::{DecoderOptions, ObjectFormat};
use crate::util::{Error, Result};
use smallvec::SmallVec;
use std::mem;
use std::str::FromStr;

/// Name of objects that never declare one.
pub const DEFAULT_NAME: &str = "no-name";

/// Spatial dimension of positions.
const POSITION_SIZE: usize = 3;

/// Leading fields of a vertex line: keyword, id, x, y, z.
const VERTEX_FIELDS: usize = 5;

type Tokens<'a> = SmallVec<[&'a str; 16]>;

/// Decode every object of `format` found in `text`.
///
/// Returns the tables in input order. Objects without vertices are
/// skipped. Any layout or number error aborts the whole call.
#[tracing::instrument(skip_all, fields(bytes = text.len(), class = format.class_name))]
pub fn decode_objects(text: &str, format: &ObjectFormat, options: &DecoderOptions) -> Result<Vec<Table>> {
    let mut decoder = Decoder::new(format, options);
    for (i, line) in text.split('\n').enumerate() {
        decoder.line(i + 1, line)?;
    }
    decoder.finish_object()?;
    tracing::debug!(objects = decoder.tables.len(), "decode done");
    Ok(decoder.tables)
}

struct Decoder<'a> {
    format: &'a ObjectFormat,
    options: &'a DecoderOptions,
    name: String,
    layout: AttributeLayout,
    /// Declared id mapped to index 0 of the current part.
    origin: i64,
    /// Vertices since the last `GOCAD` header.
    vertex_count: usize,
    positions: Vec<f32>,
    indices: Vec<u32>,
    tables: Vec<Table>,
}

impl<'a> Decoder<'a> {
    fn new(format: &'a ObjectFormat, options: &'a DecoderOptions) -> Self {
        Self {
            format,
            options,
            name: DEFAULT_NAME.to_string(),
            layout: AttributeLayout::default(),
            origin: 0,
            vertex_count: 0,
            positions: Vec::new(),
            indices: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            return Ok(());
        }

        let tokens: Tokens = line.split_whitespace().collect();
        let Some(&keyword) = tokens.first() else {
            return Ok(());
        };

        if let Some(name) = object_name(keyword, line) {
            self.name = name;
            return Ok(());
        }

        if keyword == self.format.separator {
            self.separate()
        } else if keyword == "GOCAD" {
            self.start_object()
        } else if keyword == "PROPERTIES" {
            self.check_declaration(line_no, keyword)?;
            self.layout.declare(tokens[1..].iter().copied());
            Ok(())
        } else if keyword == "ESIZES" {
            self.sizes(line_no, &tokens)
        } else if keyword == "VRTX" || keyword == "PVRTX" {
            self.vertex(line_no, line, &tokens)
        } else if self.format.has_faces() && keyword == self.format.keyword {
            self.face(line_no, &tokens)
        } else {
            Ok(())
        }
    }

    /// Separator: emit the part so far, keep the layout and keep counting
    /// vertex ids. Ids of the next part are re-based on the number of
    /// vertices seen since the last `GOCAD` header.
    fn separate(&mut self) -> Result<()> {
        self.finish_object()?;
        self.layout.clear_values();
        self.origin = self.vertex_count as i64;
        Ok(())
    }

    /// `GOCAD` header: emit the object so far and start from scratch.
    fn start_object(&mut self) -> Result<()> {
        self.finish_object()?;
        self.name = DEFAULT_NAME.to_string();
        self.layout.reset();
        self.origin = 0;
        self.vertex_count = 0;
        Ok(())
    }

    /// Attribute declarations cannot change the layout of vertices already
    /// read in the current part.
    fn check_declaration(&self, line_no: usize, keyword: &str) -> Result<()> {
        if self.positions.is_empty() {
            Ok(())
        } else {
            Err(Error::MisplacedDeclaration {
                line: line_no,
                keyword: keyword.to_string(),
            })
        }
    }

    fn sizes(&mut self, line_no: usize, tokens: &Tokens) -> Result<()> {
        let sizes = tokens[1..]
            .iter()
            .map(|t| {
                parse::<usize>(line_no, t, "a positive integer").and_then(|size| {
                    if size == 0 {
                        Err(Error::InvalidToken {
                            line: line_no,
                            token: t.to_string(),
                            expected: "a positive integer",
                        })
                    } else {
                        Ok(size)
                    }
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        if sizes.len() != self.layout.num_attributes() {
            return Err(Error::AttributeSizeMismatch {
                line: line_no,
                properties: self.layout.num_attributes(),
                sizes: sizes.len(),
            });
        }

        sizes
            .iter()
            .zip(&tokens[1..])
            .try_fold(0usize, |total, (&size, token)| {
                total.checked_add(size).ok_or_else(|| Error::InvalidToken {
                    line: line_no,
                    token: token.to_string(),
                    expected: "a component count with a representable total",
                })
            })?;

        self.check_declaration(line_no, tokens[0])?;
        if self.layout.is_established() {
            // the first vertex froze the layout
            tracing::warn!(line = line_no, "ESIZES after first vertex ignored");
            return Ok(());
        }
        self.layout.set_sizes(sizes);
        Ok(())
    }

    fn vertex(&mut self, line_no: usize, line: &str, tokens: &Tokens) -> Result<()> {
        if tokens.len() < VERTEX_FIELDS {
            return Err(Error::MissingToken {
                line: line_no,
                keyword: tokens[0].to_string(),
                needed: VERTEX_FIELDS,
                got: tokens.len(),
            });
        }

        // checked before establishing, so column allocation is bounded by
        // the line length
        let expected = self.layout.flat_width();
        let actual = tokens.len() - VERTEX_FIELDS;
        if expected != actual {
            return Err(Error::AttributeArityMismatch {
                line: line_no,
                expected,
                actual,
                content: line.to_string(),
            });
        }

        if !self.layout.is_established() {
            self.origin = parse::<i64>(line_no, tokens[1], "an integer vertex id")?;
            self.layout.establish();
            tracing::trace!(
                line = line_no,
                origin = self.origin,
                attributes = self.layout.num_attributes(),
                width = expected,
                "attribute layout established"
            );
        }

        for t in &tokens[2..VERTEX_FIELDS] {
            self.positions.push(parse::<f64>(line_no, t, "a number")? as f32);
        }

        let values = tokens[VERTEX_FIELDS..]
            .iter()
            .map(|t| parse::<f64>(line_no, t, "a number").map(|v| v as f32))
            .collect::<Result<SmallVec<[f32; 8]>>>()?;
        self.layout.push_row(values);

        self.vertex_count += 1;
        Ok(())
    }

    fn face(&mut self, line_no: usize, tokens: &Tokens) -> Result<()> {
        let arity = self.format.face_arity;
        if tokens.len() < arity + 1 {
            return Err(Error::MissingToken {
                line: line_no,
                keyword: tokens[0].to_string(),
                needed: arity + 1,
                got: tokens.len(),
            });
        }

        for t in &tokens[1..=arity] {
            let id = parse::<i64>(line_no, t, "an integer vertex id")?;
            let index = id - self.origin;
            let index = u32::try_from(index).map_err(|_| Error::InvalidIndex { line: line_no, index })?;
            self.indices.push(index);
        }
        Ok(())
    }

    /// Turn the scratch state into a table, if any vertex was seen.
    fn finish_object(&mut self) -> Result<()> {
        if self.positions.is_empty() {
            if !self.indices.is_empty() {
                tracing::trace!(name = %self.name, "dropping faces without vertices");
                self.indices.clear();
            }
            return Ok(());
        }

        let allocation = self.options.allocation;
        let positions = mem::take(&mut self.positions);
        let indices = mem::take(&mut self.indices);
        let attributes = self.layout.take_attributes();

        let user_data: UserData = [
            (UserData::CLASS_NAME_KEY, serde_json::Value::from(self.format.class_name)),
            (UserData::EXTENSION_KEY, serde_json::Value::from(self.format.extension)),
            (UserData::NAME_KEY, serde_json::Value::from(self.name.as_str())),
            (UserData::ATTRIBUTE_NAMES_KEY, serde_json::Value::from(self.layout.names().to_vec())),
        ]
        .into_iter()
        .collect();

        let mut table = Table::new([(POSITIONS, float_series(positions, POSITION_SIZE, allocation)?)], user_data)?;
        if !indices.is_empty() {
            table.insert(INDICES, index_series(indices, self.format.face_arity, allocation)?)?;
        }

        for (name, size, values) in attributes {
            table.insert(name, float_series(values, size, allocation)?)?;
        }

        tracing::debug!(
            name = %self.name,
            vertices = table.vertex_count(),
            faces = table.face_count(),
            index_kind = ?table.indices().map(|s| s.kind()),
            attributes = self.layout.num_attributes(),
            seen = self.vertex_count,
            "object decoded"
        );
        self.tables.push(table);
        Ok(())
    }
}

/// Object name from a `name:` line or a one-line `HEADER {name: ...}`.
fn object_name(keyword: &str, line: &str) -> Option<String> {
    let value = if keyword == "HEADER" {
        let start = line.find("name:")? + "name:".len();
        let rest = &line[start..];
        rest.split('}').next().unwrap_or(rest)
    } else {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "name" {
            return None;
        }
        value
    };
    let name = value.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

fn parse<T: FromStr>(line: usize, token: &str, expected: &'static str) -> Result<T> {
    token.parse().map_err(|_| Error::InvalidToken {
        line,
        token: token.to_string(),
        expected,
    })
}
