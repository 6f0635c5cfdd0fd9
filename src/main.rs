use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use zettelgraph::render;
use zettelgraph::{Config, NoteId, Zettelkasten};

#[derive(Parser, Debug)]
#[command(name = "zettel")]
#[command(about = "Query the structure of a Zettelkasten")]
struct Args {
    /// Directory containing the zettelkasten (overrides zettel.toml)
    #[arg(long, global = true)]
    zettelkasten: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Graph statistics
    Stats,
    /// Report notes referencing each other
    Lint,
    /// Unlinked notes
    Inbox,
    /// Entry notes
    Entries,
    /// Exit notes
    Exits,
    /// All notes, most outgoing references first
    Hubs,
    /// Show a single note
    Show { id: NoteId },
    /// Search for a word or phrase
    Find { term: String },
    /// Notes within a number of hops
    Neighbors {
        id: NoteId,
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
        /// Follow references backwards
        #[arg(short, long)]
        reverse: bool,
    },
    /// Collect every note leading into the given notes
    Collect {
        #[arg(required = true)]
        ids: Vec<NoteId>,
    },
    /// All shortest paths between two notes
    Paths { source: NoteId, target: NoteId },
    /// Shortest paths from a note to every reachable entry note
    Lattice { id: NoteId },
    /// Existing and suggested references to a note
    References { id: NoteId },
    /// Train of thought starting at a note
    Train {
        id: NoteId,
        /// Maximum distance from the source
        #[arg(short, long)]
        distance: Option<u64>,
    },
    /// Most important notes (PageRank)
    Rank,
    /// Maps of content
    Index,
    /// Alphabetical register
    Register,
    /// Graphviz DOT map of all notes
    Map,
    /// Create a new note
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        body: String,
    },
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(dir) = &args.zettelkasten {
        config.zettelkasten.directory = zettelgraph::config::expand_home(dir);
    }

    let level = if args.debug {
        "debug".to_string()
    } else {
        config.zettelkasten.log_level.clone()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::debug!("Zettelkasten: {}", config.directory().display());
    let mut zk = Zettelkasten::open(config.directory(), &config.zettelkasten.extension)
        .with_context(|| format!("Failed to open {}", config.directory().display()))?;

    let json = args.json;
    let graph = zk.graph()?;

    match args.command {
        Command::Stats => {
            let stats = graph.statistics();
            emit(json, &stats, || render::render_statistics(&stats))
        }
        Command::Lint => {
            let pairs = graph.reciprocal_references();
            emit(json, &pairs, || render::render_lint(graph, &pairs))
        }
        Command::Inbox => {
            let ids = graph.inbox();
            emit(json, &ids, || {
                render::render_notes(graph, ids.iter().map(|&id| (id, Some(0))))
            })
        }
        Command::Entries => {
            let ids = graph.entry_notes();
            emit(json, &ids, || render::render_notes(graph, ids.iter().map(|&id| (id, None))))
        }
        Command::Exits => {
            let ids = graph.exit_notes();
            emit(json, &ids, || render::render_notes(graph, ids.iter().map(|&id| (id, None))))
        }
        Command::Hubs => {
            let hubs = graph.hubs();
            emit(json, &hubs, || {
                render::render_notes(graph, hubs.iter().map(|&(id, c)| (id, Some(c))))
            })
        }
        Command::Show { id } => {
            let note = graph.note(id)?;
            let roles = graph.roles(id)?;
            emit(json, &(note, &roles), || {
                format!(
                    "{}\n[in:{}, out:{}, entry:{}, exit:{}]\n\n{}\n",
                    note, roles.in_degree, roles.out_degree, roles.entry, roles.exit, note.body
                )
            })
        }
        Command::Find { term } => {
            let ids: Vec<NoteId> = graph.find(&term)?.iter().map(|n| n.id).collect();
            emit(json, &ids, || render::render_notes(graph, ids.iter().map(|&id| (id, None))))
        }
        Command::Neighbors { id, depth, reverse } => {
            let ids = if reverse {
                graph.predecessors(id, depth)?
            } else {
                graph.successors(id, depth)?
            };
            emit(json, &ids, || render::render_notes(graph, ids.iter().map(|&id| (id, None))))
        }
        Command::Collect { ids } => {
            let collected = graph.collect(ids)?;
            emit(json, &collected, || {
                render::render_notes(graph, collected.iter().map(|&id| (id, None)))
            })
        }
        Command::Paths { source, target } => {
            let paths = graph.paths_between(source, target)?;
            emit(json, &paths, || {
                if paths.is_empty() {
                    format!("No path from {} to {}\n", source, target)
                } else {
                    paths
                        .iter()
                        .map(|p| format!("{}\n", render::render_path(p)))
                        .collect()
                }
            })
        }
        Command::Lattice { id } => {
            let lattice = graph.lattice(id)?;
            emit(json, &lattice, || render::render_lattice(graph, &lattice))
        }
        Command::References { id } => {
            let refs = graph.references_to(id, &graph.exit_notes(), &graph.entry_notes())?;
            emit(json, &refs, || render::render_references(graph, &refs))
        }
        Command::Train { id, distance } => {
            let train: Vec<(u64, NoteId)> = graph
                .train_of_thought(id)?
                .into_iter()
                .filter(|&(d, n)| {
                    let keep = distance.map_or(true, |max| d < max);
                    if !keep {
                        log::debug!("{:>5}. SKIPPED", n);
                    }
                    keep
                })
                .collect();
            emit(json, &train, || {
                render::render_notes(graph, train.iter().map(|&(d, id)| (id, Some(d as usize))))
            })
        }
        Command::Rank => {
            let ranked = graph.rank(&config.ranking);
            emit(json, &ranked, || render::render_ranking(graph, &ranked))
        }
        Command::Index => {
            let clusters = graph.map_of_content(config.clustering.min_size);
            emit(json, &clusters, || render::render_index(graph, &clusters))
        }
        Command::Register => {
            let groups = graph.register();
            emit(json, &groups, || render::render_register(&groups))
        }
        Command::Map => {
            let dot = graph.to_dot();
            emit(json, &dot, || dot.clone())
        }
        Command::Create { title, body } => {
            let note = zk.create_note(&title, &body)?;
            emit(json, &note, || format!("{}\n", note))
        }
    }
}
