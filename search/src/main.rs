use anyhow::Result;
use boolsearch_core::{DocId, IndexError, Searcher};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Evaluate AND/OR/NOT queries against a boolean index", long_about = None)]
struct Args {
    /// Index directory holding docs.tsv, dict.tsv and postings.bin
    #[arg(long, default_value = "out_bool/index")]
    index_dir: PathBuf,
    /// Query to run; without it, queries are read from stdin one per line
    #[arg(long)]
    query: Option<String>,
    /// Maximum number of result rows to print
    #[arg(long, default_value_t = 10)]
    topk: usize,
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let code = err.downcast_ref::<IndexError>().map_or(1, IndexError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut searcher = Searcher::open(&args.index_dir)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(query) = &args.query {
        let ids = searcher.search(query)?;
        tracing::debug!(query = %query, hits = ids.len(), "query evaluated");
        print_results(&mut out, &searcher, &ids, args.topk)?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "query> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else { break };
        let query = line.trim();
        if query.is_empty() {
            break;
        }
        match searcher.search(query) {
            Ok(ids) => print_results(&mut out, &searcher, &ids, args.topk)?,
            Err(err) if err.is_bad_query() => writeln!(out, "ERROR: {err}")?,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// `hits: N`, then up to `topk` `id<TAB>path` rows. Ids with no document
/// table row are skipped without counting toward `topk`.
fn print_results<W: Write>(out: &mut W, searcher: &Searcher, ids: &[DocId], topk: usize) -> io::Result<()> {
    writeln!(out, "hits: {}", ids.len())?;
    for doc in ids.iter().filter_map(|&id| searcher.document(id)).take(topk) {
        writeln!(out, "{}\t{}", doc.id, doc.path)?;
    }
    Ok(())
}
