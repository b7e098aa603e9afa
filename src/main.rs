use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use getem::models::{ItemId, NoteId, TagId};
use getem::utils::{ensure_database_directory, get_database_path, init_logging};
use getem::{
    Database, DeletionRequest, KeyValueStore, NoteData, NoteService, OptionKey, OptionValue,
    ResolvedNote, SearchQuery, Tag, ValidationError,
};

/// getem - tagged notes with title and tag search
#[derive(Parser)]
#[command(name = "getem")]
#[command(about = "Keep notes, tag them, find them again")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Manage tags
    #[command(subcommand)]
    Tag(TagCommand),
    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Find notes by title and tags
    Search(SearchCommand),
    /// Show and change settings
    #[command(subcommand)]
    Options(OptionsCommand),
    /// Manage the to-do checklist
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Add sample notes and tags without touching existing data
    Demo(DemoCommand),
    /// Show where data is stored and what each slot holds
    Storage,
    /// Open the interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum TagCommand {
    /// Create a tag
    Add { label: String },
    /// Change a tag's label
    Rename {
        /// Tag label or id prefix
        tag: String,
        label: String,
    },
    /// Delete a tag and remove it from every note
    Delete {
        /// Tag label or id prefix
        tag: String,
    },
    /// Move a tag to the position of another tag
    Move { tag: String, over: String },
    /// List tags in order
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Create a note
    New {
        title: String,
        #[command(flatten)]
        fields: NoteFields,
    },
    /// Change a note; omitted fields keep their value
    Edit {
        /// Note id prefix
        note: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: NoteFields,
    },
    /// Print one note
    Show {
        note: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a note
    Delete {
        note: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a note to the position of another note
    Move { note: String, over: String },
    /// List notes in order
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct NoteFields {
    /// Markdown body
    #[arg(short, long)]
    body: Option<String>,
    /// Comma-separated tag labels
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
    /// Create tags that do not exist yet
    #[arg(long)]
    create_tags: bool,
}

#[derive(Args)]
struct SearchCommand {
    /// Case-insensitive title substring
    #[arg(long)]
    title: Option<String>,
    /// Comma-separated tag labels; a note must carry all of them
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum OptionsCommand {
    /// Print every option with its effective value
    List,
    /// Set an option, e.g. `maxTagLabelLength 20`
    Set { key: String, value: String },
    /// Restore an option's default
    Reset { key: String },
}

#[derive(Subcommand)]
enum TodoCommand {
    /// Add an item
    Add { title: String },
    /// Flip an item between done and open
    Toggle { item: String },
    /// Delete an item
    Delete { item: String },
    /// List items
    List,
}

#[derive(Args)]
struct DemoCommand {
    /// Stop offering demo data in the TUI instead of generating it
    #[arg(long)]
    never: bool,
}

/// An argument that names nothing, or more than one thing.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UsageError(String);

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are validation failures and arguments that match no item.
/// Everything else (storage, I/O) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ValidationError>().is_some() || error.downcast_ref::<UsageError>().is_some()
}

fn open_service() -> Result<NoteService> {
    let db_path = get_database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    NoteService::new(db).context("Failed to load notes")
}

fn run(cli: &Cli) -> Result<()> {
    let mut service = open_service()?;

    match &cli.command {
        Commands::Storage => {
            let db_path = get_database_path()?;
            print_storage(&db_path.display().to_string(), service.storage(), &mut io::stdout())
        }
        Commands::Tui => getem::tui::run(&mut service),
        Commands::Note(NoteCommand::Delete { note, yes: false }) => {
            let id = resolve_note(&service, note)?;
            let stdin = io::stdin();
            delete_note(&mut service, &id, &mut stdin.lock(), &mut io::stdout())
        }
        command => execute(command, &mut service, &mut io::stdout()),
    }
}

/// Executes a non-interactive command.
///
/// Separated from `run` so tests can use in-memory storage and capture output.
fn execute<S: KeyValueStore>(
    command: &Commands,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Tag(cmd) => execute_tag(cmd, service, out),
        Commands::Note(cmd) => execute_note(cmd, service, out),
        Commands::Search(cmd) => execute_search(cmd, service, out),
        Commands::Options(cmd) => execute_options(cmd, service, out),
        Commands::Todo(cmd) => execute_todo(cmd, service, out),
        Commands::Demo(cmd) => {
            if cmd.never {
                service.update_option(OptionKey::HideDemoPerm, OptionValue::Bool(true))?;
                writeln!(out, "Demo prompt hidden")?;
            } else {
                let summary = service.generate_demo()?;
                writeln!(
                    out,
                    "Added {} demo notes and {} new tags",
                    summary.notes_created, summary.tags_created
                )?;
            }
            Ok(())
        }
        Commands::Storage | Commands::Tui => {
            anyhow::bail!("command needs a terminal and the default database")
        }
    }
}

fn execute_tag<S: KeyValueStore>(
    cmd: &TagCommand,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TagCommand::Add { label } => {
            let tag = service.add_tag(label)?;
            writeln!(out, "Tag created (id: {})", short_id(tag.id().as_str()))?;
        }
        TagCommand::Rename { tag, label } => {
            let id = resolve_tag(service, tag)?;
            service.rename_tag(&id, label)?;
            writeln!(out, "Tag renamed to {label}")?;
        }
        TagCommand::Delete { tag } => {
            let id = resolve_tag(service, tag)?;
            service.delete_tag(&id)?;
            writeln!(out, "Tag deleted")?;
        }
        TagCommand::Move { tag, over } => {
            let active = resolve_tag(service, tag)?;
            let over = resolve_tag(service, over)?;
            service.reorder_tags(&active, &over)?;
        }
        TagCommand::List { json } => {
            if *json {
                writeln!(
                    out,
                    "{}",
                    serde_json::to_string_pretty(service.tags_with_notes_info())?
                )?;
            } else {
                for info in service.tags_with_notes_info() {
                    let usage = if info.is_used_by_notes() { "" } else { " (unused)" };
                    writeln!(out, "{}  {}{usage}", short_id(info.id().as_str()), info.label())?;
                }
            }
        }
    }
    Ok(())
}

fn execute_note<S: KeyValueStore>(
    cmd: &NoteCommand,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        NoteCommand::New { title, fields } => {
            let tags = note_tags(service, fields, &[])?;
            let body = fields.body.clone().unwrap_or_default();
            let note = service.create_note(NoteData::new(title.as_str(), body, tags))?;
            writeln!(out, "Note created (id: {})", short_id(note.id.as_str()))?;
        }
        NoteCommand::Edit {
            note,
            title,
            fields,
        } => {
            let id = resolve_note(service, note)?;
            let current = service
                .resolved_note(&id)
                .cloned()
                .ok_or_else(|| UsageError(format!("no note matches \"{note}\"")))?;
            let tags = note_tags(service, fields, &current.tags)?;
            let data = NoteData::new(
                title.clone().unwrap_or(current.title),
                fields.body.clone().unwrap_or(current.body),
                tags,
            );
            service.update_note(&id, data)?;
            writeln!(out, "Note updated")?;
        }
        NoteCommand::Show { note, json } => {
            let id = resolve_note(service, note)?;
            if let Some(note) = service.resolved_note(&id) {
                if *json {
                    writeln!(out, "{}", serde_json::to_string_pretty(note)?)?;
                } else {
                    print_note(note, out)?;
                }
            }
        }
        NoteCommand::Delete { note, .. } => {
            let id = resolve_note(service, note)?;
            service.delete_note(&id)?;
            writeln!(out, "Note deleted")?;
        }
        NoteCommand::Move { note, over } => {
            let active = resolve_note(service, note)?;
            let over = resolve_note(service, over)?;
            service.reorder_notes(&active, &over)?;
        }
        NoteCommand::List { json } => {
            print_notes(service.resolved_notes().iter(), *json, out)?;
            if service.notes().is_empty() && service.demo_prompt_visible() {
                eprintln!("No notes yet. Run `getem demo` to add some sample notes.");
            }
        }
    }
    Ok(())
}

/// Asks before deleting when the confirmation option is on.
fn delete_note<S: KeyValueStore>(
    service: &mut NoteService<S>,
    id: &NoteId,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    if let DeletionRequest::NeedsConfirmation(id) = service.request_note_deletion(id)? {
        let title = service.note(&id).map(|n| n.title.clone()).unwrap_or_default();
        write!(out, "Delete \"{title}\"? [y/N] ")?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer).context("Failed to read answer")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            writeln!(out, "Kept")?;
            return Ok(());
        }
        service.delete_note(&id)?;
    }
    writeln!(out, "Note deleted")?;
    Ok(())
}

fn execute_search<S: KeyValueStore>(
    cmd: &SearchCommand,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    let mut query = SearchQuery::new().with_title(cmd.title.clone().unwrap_or_default());
    for label in parse_tags(cmd.tags.as_deref().unwrap_or_default()) {
        let info = service
            .tags_with_notes_info()
            .iter()
            .find(|info| info.label() == label)
            .ok_or_else(|| UsageError(format!("no tag labeled \"{label}\"")))?;
        query.select_tag(info.clone());
    }

    if query.has_unused_selection() && !service.options().hide_tooltips() {
        eprintln!("Note: an unused tag is selected, so no note matches");
    }
    print_notes(service.search(&query).into_iter(), cmd.json, out)
}

fn execute_options<S: KeyValueStore>(
    cmd: &OptionsCommand,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        OptionsCommand::List => {
            for key in OptionKey::ALL {
                let marker = if service.options().is_set(key) { "" } else { " (default)" };
                writeln!(out, "{key} = {}{marker}", service.options().get(key))?;
            }
        }
        OptionsCommand::Set { key, value } => {
            let key: OptionKey = key.parse()?;
            let value = key.parse_value(value)?;
            service.update_option(key, value)?;
            writeln!(out, "{key} = {value}")?;
        }
        OptionsCommand::Reset { key } => {
            let key: OptionKey = key.parse()?;
            service.reset_option(key)?;
            writeln!(out, "{key} = {} (default)", service.options().get(key))?;
        }
    }
    Ok(())
}

fn execute_todo<S: KeyValueStore>(
    cmd: &TodoCommand,
    service: &mut NoteService<S>,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TodoCommand::Add { title } => {
            let item = service.add_item(title)?;
            writeln!(out, "Item added (id: {})", short_id(item.id.as_str()))?;
        }
        TodoCommand::Toggle { item } => {
            let id = resolve_item(service, item)?;
            let completed = service
                .checklist()
                .iter()
                .find(|i| i.id == id)
                .is_some_and(|i| i.completed);
            service.toggle_item(&id, !completed)?;
        }
        TodoCommand::Delete { item } => {
            let id = resolve_item(service, item)?;
            service.delete_item(&id)?;
        }
        TodoCommand::List => {
            for item in service.checklist() {
                let mark = if item.completed { "x" } else { " " };
                writeln!(out, "[{mark}] {}  {}", short_id(item.id.as_str()), item.title)?;
            }
        }
    }
    Ok(())
}

// ---- argument resolution ----

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Finds the single candidate equal to `prefix` or starting with it.
fn unique_match<'a, T: Clone + 'a>(
    prefix: &str,
    kind: &str,
    candidates: impl Iterator<Item = (&'a str, T)>,
) -> Result<T> {
    let matches: Vec<(&str, T)> = candidates.filter(|(id, _)| id.starts_with(prefix)).collect();
    if let Some((_, exact)) = matches.iter().find(|(id, _)| *id == prefix) {
        return Ok(exact.clone());
    }
    match matches.as_slice() {
        [(_, only)] => Ok(only.clone()),
        [] => Err(UsageError(format!("no {kind} matches \"{prefix}\"")).into()),
        _ => Err(UsageError(format!("\"{prefix}\" matches more than one {kind}")).into()),
    }
}

fn resolve_note<S: KeyValueStore>(service: &NoteService<S>, prefix: &str) -> Result<NoteId> {
    unique_match(
        prefix,
        "note",
        service.notes().iter().map(|n| (n.id.as_str(), n.id.clone())),
    )
}

/// Tags are named by label first, then by id prefix.
fn resolve_tag<S: KeyValueStore>(service: &NoteService<S>, name: &str) -> Result<TagId> {
    if let Some(tag) = service.find_tag_by_label(name) {
        return Ok(tag.id().clone());
    }
    unique_match(
        name,
        "tag",
        service.tags().iter().map(|t| (t.id().as_str(), t.id().clone())),
    )
}

fn resolve_item<S: KeyValueStore>(service: &NoteService<S>, prefix: &str) -> Result<ItemId> {
    unique_match(
        prefix,
        "item",
        service.checklist().iter().map(|i| (i.id.as_str(), i.id.clone())),
    )
}

/// The tags for a new or edited note.
///
/// Without `--tags` the note keeps `current`. Unknown labels are an error
/// unless `--create-tags` is given.
fn note_tags<S: KeyValueStore>(
    service: &mut NoteService<S>,
    fields: &NoteFields,
    current: &[Tag],
) -> Result<Vec<Tag>> {
    let Some(raw) = fields.tags.as_deref() else {
        return Ok(current.to_vec());
    };
    let labels = parse_tags(raw);
    if fields.create_tags {
        return service.ensure_tags(&labels);
    }
    labels
        .iter()
        .map(|label| {
            service.find_tag_by_label(label).cloned().ok_or_else(|| {
                anyhow::Error::from(UsageError(format!(
                    "no tag labeled \"{label}\" (use --create-tags to create it)"
                )))
            })
        })
        .collect()
}

/// Splits on commas, trims each tag and drops empty entries.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ---- output ----

fn print_note(note: &ResolvedNote, out: &mut impl Write) -> Result<()> {
    writeln!(out, "# {}", note.title)?;
    if !note.tags.is_empty() {
        writeln!(out, "tags: {}", note.tag_labels().join(", "))?;
    }
    writeln!(out, "id: {}", note.id)?;
    if !note.body.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", note.body)?;
    }
    Ok(())
}

fn print_notes<'a>(
    notes: impl Iterator<Item = &'a ResolvedNote>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if json {
        let notes: Vec<&ResolvedNote> = notes.collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&notes)?)?;
        return Ok(());
    }
    for note in notes {
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", note.tag_labels().join(", "))
        };
        writeln!(out, "{}  {}{tags}", short_id(note.id.as_str()), note.title)?;
    }
    Ok(())
}

fn print_storage(path: &str, db: &Database, out: &mut impl Write) -> Result<()> {
    writeln!(out, "database: {path}")?;
    let format = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    for slot in db.slot_info()? {
        let updated = slot
            .updated_at
            .format(format)
            .unwrap_or_else(|_| "????-??-?? ??:??:??".to_string());
        writeln!(out, "{:<8} {:>8} bytes  updated {updated} UTC", slot.key, slot.bytes)?;
    }
    Ok(())
}
