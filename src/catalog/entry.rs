use crate::locus::normalize_id;
use crate::utils::{format_allele, open_catalog_reader, round_tenth, to_tenths, Result};
use itertools::Itertools;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub size: f64,
    /// Repeat structure such as `AGAT[11] AGGT`.
    pub repeat_structure: Option<String>,
    pub sequence: Option<String>,
    /// Another entry of the same marker has the same size.
    pub isoallele: bool,
    /// Display label; isoalleles get a letter suffix in catalog order (`14a`, `14b`).
    pub label: String,
}

impl CatalogEntry {
    pub fn new(size: f64, repeat_structure: Option<&str>, sequence: Option<&str>) -> Self {
        let size = round_tenth(size);
        Self {
            size,
            repeat_structure: repeat_structure.map(str::to_string),
            sequence: sequence.map(str::to_string),
            isoallele: false,
            label: format_allele(size),
        }
    }

    pub fn key(&self) -> i64 {
        to_tenths(self.size)
    }
}

/// Static allele catalog of one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCatalog {
    pub marker: String,
    pub entries: Vec<CatalogEntry>,
}

impl MarkerCatalog {
    /// Builds the catalog and derives isoallele flags and labels.
    pub fn new(marker: &str, mut entries: Vec<CatalogEntry>) -> Self {
        let counts = entries.iter().counts_by(|e| e.key());
        let mut seen: HashMap<i64, u8> = HashMap::new();
        for entry in entries.iter_mut() {
            let key = entry.key();
            entry.isoallele = counts[&key] > 1;
            entry.label = if entry.isoallele {
                let index = seen.entry(key).or_insert(0);
                let suffix = isoallele_suffix(*index);
                *index = index.saturating_add(1);
                format!("{}{}", format_allele(entry.size), suffix)
            } else {
                format_allele(entry.size)
            };
        }
        Self {
            marker: marker.to_string(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry indices grouped by size, ascending.
    pub fn size_groups(&self) -> Vec<Vec<usize>> {
        self.entries
            .iter()
            .enumerate()
            .sorted_by_key(|(i, e)| (e.key(), *i))
            .chunk_by(|(_, e)| e.key())
            .into_iter()
            .map(|(_, group)| group.map(|(i, _)| i).collect())
            .collect()
    }
}

fn isoallele_suffix(index: u8) -> char {
    (b'a' + index.min(25)) as char
}

/// Allele catalogs of several markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    markers: Vec<MarkerCatalog>,
}

impl Catalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_catalog_reader(path)?;
        Self::from_reader(reader).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Reads a tab-separated table whose header names the columns `marker`,
    /// `size` and optionally `repeat_structure` and `sequence`. Empty or `-`
    /// cells are absent values; `#` lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| {
                line.map(|l| (i + 1, l))
                    .map_err(|e| format!("Error reading line {}: {}", i + 1, e))
            })
            .filter_ok(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'));

        let (_, header) = lines
            .next()
            .ok_or_else(|| "Catalog is empty".to_string())??;
        let columns = Columns::from_header(&header)?;

        let mut grouped: Vec<(String, Vec<CatalogEntry>)> = Vec::new();
        for line in lines {
            let (line_number, line) = line?;
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let (marker, entry) = columns
                .parse_entry(&fields)
                .map_err(|e| format!("Invalid catalog entry at line {}: {}", line_number, e))?;
            match grouped
                .iter_mut()
                .find(|(m, _)| normalize_id(m) == normalize_id(&marker))
            {
                Some((_, entries)) => entries.push(entry),
                None => grouped.push((marker, vec![entry])),
            }
        }

        let markers = grouped
            .into_iter()
            .map(|(marker, entries)| MarkerCatalog::new(&marker, entries))
            .collect();
        Ok(Self { markers })
    }

    /// Case- and separator-insensitive marker lookup.
    pub fn marker(&self, name: &str) -> Option<&MarkerCatalog> {
        let key = normalize_id(name);
        self.markers.iter().find(|m| normalize_id(&m.marker) == key)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerCatalog> {
        self.markers.iter()
    }
}

struct Columns {
    marker: usize,
    size: usize,
    repeat_structure: Option<usize>,
    sequence: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<String> = header
            .split('\t')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        Ok(Self {
            marker: find("marker").ok_or("Catalog header is missing the 'marker' column")?,
            size: find("size").ok_or("Catalog header is missing the 'size' column")?,
            repeat_structure: find("repeat_structure"),
            sequence: find("sequence"),
        })
    }

    fn parse_entry(&self, fields: &[&str]) -> Result<(String, CatalogEntry)> {
        let cell = |index: usize| {
            fields
                .get(index)
                .copied()
                .filter(|v| !v.is_empty() && *v != "-")
        };

        let marker = cell(self.marker).ok_or("marker is empty")?;
        let size_field = cell(self.size).ok_or("size is empty")?;
        let size = size_field
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite() && *s >= 0.0)
            .ok_or_else(|| format!("size is not a non-negative number: {}", size_field))?;

        let entry = CatalogEntry::new(
            size,
            self.repeat_structure.and_then(cell),
            self.sequence.and_then(cell),
        );
        Ok((marker.to_string(), entry))
    }
}
