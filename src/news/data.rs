use super::types::{BODY_COLUMN, Dataset, WORD_COUNT_COLUMN};
use super::utils::count_words;
use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Dataset::new(headers, records))
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_dataset(file)
}

/// Word count for every row, in row order. The `body` column is required.
pub fn derive_word_counts(dataset: &Dataset) -> Result<Vec<u64>> {
    let bodies = dataset
        .column(BODY_COLUMN)
        .ok_or_else(|| Error::MissingColumn(BODY_COLUMN.to_string()))?;
    Ok(bodies.into_iter().map(count_words).collect())
}

/// Write the dataset with `word_count` appended as the last column. An existing
/// `word_count` column is overwritten in place instead.
pub fn write_with_word_counts<W: Write>(
    dataset: &Dataset,
    word_counts: &[u64],
    writer: W,
) -> Result<()> {
    if word_counts.len() != dataset.len() {
        return Err(Error::ValidationError(format!(
            "{} word counts for {} rows",
            word_counts.len(),
            dataset.len()
        )));
    }

    let existing = dataset.column_index(WORD_COUNT_COLUMN);
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut headers = dataset.headers.clone();
    if existing.is_none() {
        headers.push_field(WORD_COUNT_COLUMN);
    }
    wtr.write_record(&headers)?;

    for (record, count) in dataset.records.iter().zip(word_counts) {
        let count = count.to_string();
        let row: StringRecord = match existing {
            Some(idx) => record
                .iter()
                .enumerate()
                .map(|(i, field)| if i == idx { count.as_str() } else { field })
                .collect(),
            None => record.iter().chain(std::iter::once(count.as_str())).collect(),
        };
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_with_word_counts(dataset: &Dataset, word_counts: &[u64], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_with_word_counts(dataset, word_counts, file)
}

/// `<output_dir>/<input-stem>_with_wordcount.csv`
pub fn output_csv_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "articles".to_string());
    output_dir.join(format!("{stem}_with_wordcount.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "title,body,source\n\
                         First,\"a b c\",Reuters\n\
                         Second,,AP\n\
                         Third,\"multi\nline  body\",Reuters\n";

    #[test]
    fn test_read_dataset() {
        let ds = read_dataset(INPUT.as_bytes()).unwrap();
        assert_eq!(ds.headers, StringRecord::from(vec!["title", "body", "source"]));
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[2].get(1), Some("multi\nline  body"));
    }

    #[test]
    fn test_ragged_row_is_an_error() {
        let result = read_dataset("a,body\n1,2,3\n".as_bytes());
        assert!(matches!(result, Err(Error::Csv(_))));
    }

    #[test]
    fn test_derive_word_counts() {
        let ds = read_dataset(INPUT.as_bytes()).unwrap();
        assert_eq!(derive_word_counts(&ds).unwrap(), vec![3, 0, 3]);
    }

    #[test]
    fn test_missing_body_column() {
        let ds = read_dataset("title,source\nx,y\n".as_bytes()).unwrap();
        match derive_word_counts(&ds) {
            Err(Error::MissingColumn(name)) => assert_eq!(name, "body"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_write_appends_word_count() {
        let ds = read_dataset(INPUT.as_bytes()).unwrap();
        let counts = derive_word_counts(&ds).unwrap();
        let mut out = Vec::new();
        write_with_word_counts(&ds, &counts, &mut out).unwrap();

        let written = read_dataset(out.as_slice()).unwrap();
        assert_eq!(written.len(), ds.len());
        assert_eq!(written.headers.len(), ds.headers.len() + 1);
        assert_eq!(written.headers.get(3), Some("word_count"));
        for (before, after) in ds.records.iter().zip(&written.records) {
            let kept: Vec<_> = after.iter().take(3).collect();
            assert_eq!(kept, before.iter().collect::<Vec<_>>());
        }
        assert_eq!(written.column("word_count").unwrap(), vec![Some("3"), Some("0"), Some("3")]);
    }

    #[test]
    fn test_write_replaces_existing_word_count() {
        let ds = read_dataset("body,word_count\nx y,99\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        write_with_word_counts(&ds, &[2], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "body,word_count\nx y,2\n");
    }

    #[test]
    fn test_write_rejects_length_mismatch() {
        let ds = read_dataset(INPUT.as_bytes()).unwrap();
        let result = write_with_word_counts(&ds, &[1], Vec::new());
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_output_csv_path() {
        assert_eq!(
            output_csv_path(Path::new("data/news-1657.csv"), Path::new("out")),
            PathBuf::from("out/news-1657_with_wordcount.csv")
        );
    }
}
