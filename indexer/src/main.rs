mod corpus;

use anyhow::Result;
use boolsearch_core::persist::IndexPaths;
use boolsearch_core::IndexBuilder;
use clap::{Parser, Subcommand};
use corpus::{enumerate, sources_under, CorpusSource};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean inverted index over plain-text files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from the .txt files of one or more corpus sources
    Build {
        /// Directory holding one subdirectory per source tag
        #[arg(long, default_value = "data_text")]
        input_dir: PathBuf,
        /// Source tags to index, in id-assignment order
        #[arg(long, value_delimiter = ',', default_value = "wikipedia_en,marinelink")]
        sources: Vec<String>,
        /// Explicit TAG=PATH source; replaces --input-dir/--sources when given
        #[arg(long = "source", value_name = "TAG=PATH")]
        explicit_sources: Vec<String>,
        /// Output directory; the index is written to <out-dir>/index
        #[arg(long, default_value = "out_bool")]
        out_dir: PathBuf,
        /// Index at most this many documents (0 = all)
        #[arg(long, default_value_t = 0)]
        max_docs: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input_dir, sources, explicit_sources, out_dir, max_docs } => {
            let sources = if explicit_sources.is_empty() {
                sources_under(&input_dir, &sources)
            } else {
                explicit_sources.iter().map(|s| CorpusSource::parse(s)).collect::<Result<Vec<_>>>()?
            };
            build_index(&sources, &out_dir, max_docs)
        }
    }
}

fn build_index(sources: &[CorpusSource], out_dir: &Path, max_docs: usize) -> Result<()> {
    let mut files = enumerate(sources);
    if files.is_empty() {
        tracing::warn!("no documents found under the configured sources, writing an empty index");
    }
    if max_docs > 0 {
        files.truncate(max_docs);
    }

    let out_paths = IndexPaths::new(out_dir.join("index"));
    let start = Instant::now();
    let mut builder = IndexBuilder::new();
    for (i, (tag, path)) in files.iter().enumerate() {
        builder.add_file(tag, path);
        if (i + 1) % 1000 == 0 {
            tracing::info!(docs = i + 1, terms = builder.num_terms(), "ingesting");
        }
    }
    let stats = builder.finish(&out_paths)?;
    let elapsed = start.elapsed();

    println!("docs: {}", stats.num_docs);
    println!("terms: {}", stats.num_terms);
    println!("postings_bytes: {}", stats.postings_bytes);
    println!("index_dir: {}", out_paths.root.display());
    println!("time_s: {:.3}", elapsed.as_secs_f64());
    println!("files: docs.tsv dict.tsv postings.bin meta.json");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_corpus_still_writes_an_index() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("corpus")).unwrap();
        let sources = vec![CorpusSource::new("empty", dir.path().join("corpus"))];
        let out_dir = dir.path().join("out");

        build_index(&sources, &out_dir, 0).unwrap();

        let paths = IndexPaths::new(out_dir.join("index"));
        for file in [paths.docs(), paths.dictionary(), paths.postings()] {
            assert_eq!(fs::metadata(file).unwrap().len(), 0);
        }
    }
}
