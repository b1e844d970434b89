//! N-Triples graph store.
//!
//! Loads a DBpedia-style N-Triples dump and answers
//! [`GraphStore::query_recipes`] by pattern lookup: every subject with a
//! `dbp:ingredients` literal becomes one [`RawRecipeRecord`] per
//! ingredients value, with the optional fields gathered from the same
//! subject's other triples.
//!
//! The file is re-read on every query so a rebuild picks up edits.
//!
//! # Supported syntax
//!
//! One triple per line, `#` comments, IRIs (`<...>`), blank nodes
//! (`_:b0`), and literals with `\t \b \n \r \f \" \' \\ \uXXXX \UXXXXXXXX`
//! escapes plus an optional `@lang` tag or `^^<datatype>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use cocktail_graph_core::models::RawRecipeRecord;
use cocktail_graph_core::store::GraphStore;
use tracing::debug;

use crate::vocab;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        lang: Option<String>,
        datatype: Option<String>,
    },
}

impl Term {
    /// The IRI, blank node label, or literal lexical value.
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(v) | Term::Blank(v) => v,
            Term::Literal { value, .. } => value,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Term::Literal { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

/// Parse an N-Triples document. Errors carry the 1-based line number.
pub fn parse_ntriples(text: &str) -> Result<Vec<Triple>> {
    let mut triples = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let triple = parse_line(trimmed).with_context(|| format!("N-Triples line {}", n + 1))?;
        triples.push(triple);
    }
    Ok(triples)
}

fn parse_line(line: &str) -> Result<Triple> {
    let mut cursor = Cursor { rest: line };

    let subject = match cursor.term()? {
        t @ (Term::Iri(_) | Term::Blank(_)) => t,
        Term::Literal { .. } => bail!("literal in subject position"),
    };
    let predicate = match cursor.term()? {
        Term::Iri(iri) => iri,
        _ => bail!("predicate must be an IRI"),
    };
    let object = cursor.term()?;

    cursor.skip_ws();
    if !cursor.eat('.') {
        bail!("expected '.' at end of triple");
    }
    cursor.skip_ws();
    if !(cursor.rest.is_empty() || cursor.rest.starts_with('#')) {
        bail!("unexpected trailing content: {}", cursor.rest);
    }

    Ok(Triple {
        subject,
        predicate,
        object,
    })
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest.starts_with(c) {
            self.rest = &self.rest[c.len_utf8()..];
            true
        } else {
            false
        }
    }

    fn term(&mut self) -> Result<Term> {
        self.skip_ws();
        if self.eat('<') {
            return Ok(Term::Iri(self.iri_body()?));
        }
        if self.rest.starts_with("_:") {
            self.rest = &self.rest[2..];
            let end = self
                .rest
                .find(|c: char| c.is_whitespace())
                .unwrap_or(self.rest.len());
            let label = &self.rest[..end];
            if label.is_empty() {
                bail!("empty blank node label");
            }
            self.rest = &self.rest[end..];
            return Ok(Term::Blank(label.to_string()));
        }
        if self.eat('"') {
            let value = self.literal_body()?;
            let mut lang = None;
            let mut datatype = None;
            if self.eat('@') {
                let end = self
                    .rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(self.rest.len());
                if end == 0 {
                    bail!("empty language tag");
                }
                lang = Some(self.rest[..end].to_ascii_lowercase());
                self.rest = &self.rest[end..];
            } else if self.rest.starts_with("^^") {
                self.rest = &self.rest[2..];
                if !self.eat('<') {
                    bail!("datatype must be an IRI");
                }
                datatype = Some(self.iri_body()?);
            }
            return Ok(Term::Literal {
                value,
                lang,
                datatype,
            });
        }
        Err(anyhow!("unexpected input: {}", self.rest))
    }

    fn iri_body(&mut self) -> Result<String> {
        let end = self.rest.find('>').ok_or_else(|| anyhow!("unterminated IRI"))?;
        let iri = unescape(&self.rest[..end])?;
        self.rest = &self.rest[end + 1..];
        Ok(iri)
    }

    fn literal_body(&mut self) -> Result<String> {
        let mut escaped = false;
        for (i, c) in self.rest.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => {
                    let value = unescape(&self.rest[..i])?;
                    self.rest = &self.rest[i + 1..];
                    return Ok(value);
                }
                _ => {}
            }
        }
        bail!("unterminated literal")
    }
}

fn unescape(raw: &str) -> Result<String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(u @ ('u' | 'U')) => {
                let width = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                if hex.len() != width {
                    bail!("truncated \\{} escape", u);
                }
                let code = u32::from_str_radix(&hex, 16)
                    .with_context(|| format!("invalid \\{} escape: {}", u, hex))?;
                let ch = char::from_u32(code)
                    .ok_or_else(|| anyhow!("invalid code point U+{:X}", code))?;
                out.push(ch);
            }
            Some(other) => bail!("unknown escape \\{}", other),
            None => bail!("dangling backslash"),
        }
    }
    Ok(out)
}

/// Gather recipe records from parsed triples.
///
/// Records follow the order in which ingredients triples appear.
pub fn records_from_triples(triples: &[Triple]) -> Vec<RawRecipeRecord> {
    let mut by_subject: HashMap<&str, Vec<&Triple>> = HashMap::new();
    for t in triples {
        by_subject.entry(t.subject.value()).or_default().push(t);
    }

    let mut records = Vec::new();
    for t in triples.iter().filter(|t| t.predicate == vocab::INGREDIENTS) {
        let subject = t.subject.value();
        let facts = by_subject.get(subject).map(Vec::as_slice).unwrap_or(&[]);

        let mut record = RawRecipeRecord::new(subject);
        record.raw_ingredient_text = Some(t.object.value().to_string());

        for fact in facts {
            let value = fact.object.value();
            match fact.predicate.as_str() {
                vocab::LABEL => {
                    let lang = fact.object.lang().unwrap_or_default().to_string();
                    record.labels.entry(lang).or_insert_with(|| value.to_string());
                }
                vocab::DESCRIPTION => {
                    let lang = fact.object.lang().unwrap_or_default().to_string();
                    record
                        .descriptions
                        .entry(lang)
                        .or_insert_with(|| value.to_string());
                }
                vocab::PREP => first(&mut record.preparation, value),
                vocab::SERVED => first(&mut record.served, value),
                vocab::GARNISH => first(&mut record.garnish, value),
                vocab::SOURCE_LINK => first(&mut record.source_link, value),
                vocab::SUBJECT => push_unique(&mut record.categories, value),
                vocab::DEPICTION => push_unique(&mut record.images, value),
                _ => {}
            }
        }
        records.push(record);
    }
    records
}

fn first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Graph store over an N-Triples file.
pub struct NTriplesGraphStore {
    path: PathBuf,
}

impl NTriplesGraphStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GraphStore for NTriplesGraphStore {
    fn name(&self) -> &str {
        "ntriples"
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read N-Triples file: {}", self.path.display()))?;
        let triples = parse_ntriples(&text)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        let records = records_from_triples(&triples);
        debug!(
            path = %self.path.display(),
            triples = triples.len(),
            records = records.len(),
            "loaded N-Triples"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# IBA sample
<http://dbpedia.org/resource/Mojito> <http://www.w3.org/2000/01/rdf-schema#label> "Mojito"@en .
<http://dbpedia.org/resource/Mojito> <http://www.w3.org/2000/01/rdf-schema#label> "Mojito"@fr .
<http://dbpedia.org/resource/Mojito> <http://dbpedia.org/property/ingredients> "* 45 ml White Rum\n* 20 ml Fresh lime juice" .
<http://dbpedia.org/resource/Mojito> <http://dbpedia.org/property/served> "Highball"@en .
<http://dbpedia.org/resource/Mojito> <http://purl.org/dc/terms/subject> <http://dbpedia.org/resource/Category:Cocktails_with_rum> .
<http://dbpedia.org/resource/Mojito> <http://xmlns.com/foaf/0.1/depiction> <http://commons.wikimedia.org/wiki/Special:FilePath/Mojito.jpg> .
<http://dbpedia.org/resource/Vieux_Carré> <http://dbpedia.org/property/ingredients> "* 30 ml Rye Whiskey" . # trailing comment
_:b0 <http://www.w3.org/2000/01/rdf-schema#label> "not a recipe" .
"#;

    #[test]
    fn test_parse_terms() {
        let triples = parse_ntriples(SAMPLE).unwrap();
        assert_eq!(triples.len(), 8);
        assert_eq!(triples[0].object.lang(), Some("en"));
        assert_eq!(
            triples[2].object.value(),
            "* 45 ml White Rum\n* 20 ml Fresh lime juice"
        );
        assert_eq!(triples[6].subject.value(), "http://dbpedia.org/resource/Vieux_Carré");
        assert_eq!(triples[7].subject, Term::Blank("b0".into()));
    }

    #[test]
    fn test_typed_literal_and_escapes() {
        let t = parse_ntriples(
            r#"<urn:a> <urn:p> "say \"hi\"\tA"^^<http://www.w3.org/2001/XMLSchema#string> ."#,
        )
        .unwrap();
        assert_eq!(
            t[0].object,
            Term::Literal {
                value: "say \"hi\"\tA".into(),
                lang: None,
                datatype: Some("http://www.w3.org/2001/XMLSchema#string".into()),
            }
        );
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_ntriples("<urn:a> <urn:p> <urn:o> .\n<urn:a> <urn:p> \"open .\n")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
        assert!(parse_ntriples("\"lit\" <urn:p> <urn:o> .").is_err());
        assert!(parse_ntriples("<urn:a> <urn:p> <urn:o>").is_err());
    }

    #[test]
    fn test_records_from_triples() {
        let records = records_from_triples(&parse_ntriples(SAMPLE).unwrap());
        assert_eq!(records.len(), 2);

        let mojito = &records[0];
        assert_eq!(mojito.labels.get("en").map(String::as_str), Some("Mojito"));
        assert_eq!(mojito.labels.len(), 2);
        assert_eq!(mojito.served.as_deref(), Some("Highball"));
        assert_eq!(mojito.categories.len(), 1);
        assert_eq!(mojito.images.len(), 1);

        let vieux = &records[1];
        assert!(vieux.labels.is_empty());
        assert_eq!(vieux.display_name(), "Vieux Carré");
    }

    #[tokio::test]
    async fn test_store_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iba.nt");
        std::fs::write(&path, SAMPLE).unwrap();
        let store = NTriplesGraphStore::new(&path);
        assert_eq!(store.query_recipes().await.unwrap().len(), 2);

        let missing = NTriplesGraphStore::new(dir.path().join("nope.nt"));
        assert!(missing.query_recipes().await.is_err());
    }
}
