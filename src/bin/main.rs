// src/bin/main.rs
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;

use contacts_backend::{
    ActiveView, BulkAction, BulkOutcome, Contact, ContactPatch, ContactStore, ContactsSession,
    NewContact, NewGroup, SeedSource, SqliteStorage, StoreConfig, config, init_tracing,
    view::{self, KNOWN_TAGS, ViewQuery},
};

#[derive(Parser, Debug)]
#[command(name = "contacts-cli")]
#[command(about = "Local contacts manager")]
struct Cli {
    /// Data dir holding contacts.db (defaults to the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Start from empty collections instead of the bundled sample data
    #[arg(long)]
    no_seed: bool,

    /// Skip confirmation prompts for destructive commands
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive prompt
    Interactive,
    /// List contacts in a view, optionally searched and tag-filtered
    List {
        #[arg(long, default_value = "all")]
        view: ActiveView,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        tag: String,
    },
    /// Add a contact (at least one --tag)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long = "tag", required = true)]
        tags: Vec<String>,
    },
    /// Toggle favorite on a contact
    Favorite { id: String },
    /// Archive (or --undo to unarchive) contacts
    Archive {
        ids: Vec<String>,
        #[arg(long)]
        undo: bool,
    },
    /// Delete contacts
    Delete { ids: Vec<String> },
    /// List groups with member counts
    Groups,
    /// Create a group
    CreateGroup {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a group; its members become ungrouped
    DeleteGroup { id: String },
    /// Move contacts into a group
    AddToGroup { group_id: String, ids: Vec<String> },
    /// Take a contact out of its group
    RemoveFromGroup { id: String },
}

type Store = ContactStore<SqliteStorage>;

struct ContactsCli {
    store: Store,
    assume_yes: bool,
}

impl ContactsCli {
    fn open(data_dir: PathBuf, seed: SeedSource, assume_yes: bool) -> Result<Self> {
        let storage = SqliteStorage::open_in_dir(&data_dir)
            .with_context(|| format!("opening store in {:?}", data_dir))?;
        let store = ContactStore::with_config(storage, StoreConfig::default().with_seed(seed));
        tracing::info!("Opened contacts store in {:?}", data_dir);
        Ok(Self { store, assume_yes })
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt.yellow());
        io::stdout().flush().ok();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    /// Resolves a full id or a unique prefix of one.
    fn resolve_contact(&self, prefix: &str) -> Result<Contact> {
        let mut matches: Vec<Contact> = self
            .store
            .load_contacts()
            .into_iter()
            .filter(|c| c.id.starts_with(prefix))
            .collect();
        match matches.len() {
            0 => bail!("no contact matches '{prefix}'"),
            1 => Ok(matches.remove(0)),
            n => bail!("'{prefix}' is ambiguous ({n} contacts)"),
        }
    }

    fn resolve_group(&self, prefix: &str) -> Result<String> {
        let ids: Vec<String> = self
            .store
            .load_groups()
            .into_iter()
            .map(|g| g.id)
            .filter(|id| id.starts_with(prefix))
            .collect();
        match ids.as_slice() {
            [] => bail!("no group matches '{prefix}'"),
            [id] => Ok(id.clone()),
            _ => bail!("'{prefix}' is ambiguous ({} groups)", ids.len()),
        }
    }

    fn resolve_all(&self, prefixes: &[String]) -> Result<Vec<String>> {
        prefixes
            .iter()
            .map(|p| self.resolve_contact(p).map(|c| c.id))
            .collect()
    }

    fn list(&self, query: &ViewQuery) {
        let contacts = self.store.load_contacts();
        let counts = view::view_counts(&contacts);
        let visible = view::project(&contacts, query);

        println!(
            "{}",
            format!("📋 {} ({} in view, {} shown)", query.view, counts.get(query.view), visible.len())
                .cyan()
        );
        println!("────────────────────────────────────────────────────────────");
        if visible.is_empty() {
            println!("No contacts found. Try adjusting your search or filter criteria.");
            return;
        }
        for contact in visible {
            print_contact(contact);
        }
    }

    fn add(&self, contact: NewContact) -> Result<()> {
        let created = self.store.add_contact(contact)?;
        println!("{}", format!("Contact {} added ({})", created.name, short(&created.id)).green());
        Ok(())
    }

    fn favorite(&self, id: &str) -> Result<()> {
        let contact = self.resolve_contact(id)?;
        if let Some(updated) = self.store.toggle_favorite(&contact.id)? {
            let verb = if updated.is_favorite { "added to" } else { "removed from" };
            println!("{}", format!("{} {} favorites", updated.name, verb).green());
        }
        Ok(())
    }

    fn archive(&self, ids: &[String], undo: bool) -> Result<()> {
        let ids = self.resolve_all(ids)?;
        let n = self.store.bulk_update_contacts(&ids, &ContactPatch::archived(!undo))?;
        let verb = if undo { "Unarchived" } else { "Archived" };
        println!("{}", format!("{verb} {n} contact(s)").green());
        Ok(())
    }

    fn delete(&self, ids: &[String]) -> Result<()> {
        let ids = self.resolve_all(ids)?;
        if ids.is_empty() {
            bail!("nothing to delete");
        }
        if !self.confirm(&format!("Delete {} contact(s)?", ids.len())) {
            println!("Cancelled.");
            return Ok(());
        }
        let n = self.store.bulk_delete_contacts(&ids)?;
        println!("{}", format!("Deleted {n} contact(s)").green());
        Ok(())
    }

    fn groups(&self) {
        let groups = self.store.groups_with_live_counts();
        println!("📁 Groups:\n────────────────────────────────────────────────────────────");
        if groups.is_empty() {
            println!("No groups found. Create one with 'create-group'!");
        }
        for group in groups {
            println!("📁 \"{}\" ({})", group.name, short(&group.id));
            if !group.description.is_empty() {
                println!("  📝 {}", group.description);
            }
            println!("  👥 Members: {}", group.member_count);
            println!("  📅 Created: {}", group.created_date.format("%Y-%m-%d %H:%M"));
            println!();
        }
    }

    fn create_group(&self, name: String, description: String) -> Result<()> {
        let group = self.store.create_group(NewGroup { name, description })?;
        println!("{}", format!("Group {} created ({})", group.name, short(&group.id)).green());
        Ok(())
    }

    fn delete_group(&self, id: &str) -> Result<()> {
        let id = self.resolve_group(id)?;
        let prompt = format!(
            "Delete group {}? This will remove all contacts from this group.",
            short(&id)
        );
        if !self.confirm(&prompt) {
            println!("Cancelled.");
            return Ok(());
        }
        self.store.delete_group(&id)?;
        println!("{}", "Group deleted.".green());
        Ok(())
    }

    fn add_to_group(&self, group_id: &str, ids: &[String]) -> Result<()> {
        let group_id = self.resolve_group(group_id)?;
        let ids = self.resolve_all(ids)?;
        let n = self.store.add_contacts_to_group(&ids, &group_id)?;
        println!("{}", format!("{n} contact(s) added to group").green());
        Ok(())
    }

    fn remove_from_group(&self, id: &str) -> Result<()> {
        let contact = self.resolve_contact(id)?;
        self.store.remove_contact_from_group(&contact.id)?;
        println!("{}", format!("{} removed from group", contact.name).green());
        Ok(())
    }

    fn interactive_mode(&self) -> Result<()> {
        println!("📇 Contacts Interactive Mode");
        println!("Type 'help' for commands, 'quit' to exit");
        println!();

        let mut session = ContactsSession::new(&self.store);
        let mut line = String::new();
        loop {
            print!("contacts[{}]> ", session.query().view);
            io::stdout().flush().ok();

            line.clear();
            if io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let (cmd, arg) = match line.trim().split_once(' ') {
                Some((c, a)) => (c, a.trim()),
                None => (line.trim(), ""),
            };
            let result = match cmd {
                "quit" | "exit" => break,
                "help" => {
                    Self::print_help();
                    Ok(())
                }
                "ls" | "list" => {
                    self.list(session.query());
                    Ok(())
                }
                "view" => arg
                    .parse::<ActiveView>()
                    .map(|v| session.set_view(v))
                    .map_err(|e| anyhow!(e)),
                "search" => {
                    session.set_search(arg);
                    Ok(())
                }
                "tag" => {
                    session.set_tag(if arg.is_empty() { "all" } else { arg });
                    Ok(())
                }
                "select" => {
                    session.set_selection_mode(true);
                    self.resolve_contact(arg).map(|c| {
                        let on = session.toggle_selection(&c.id);
                        println!("{} {}", if on { "Selected" } else { "Deselected" }, c.name);
                    })
                }
                "bulk" => self.run_bulk(&mut session, arg),
                "fav" => self.resolve_contact(arg).and_then(|c| {
                    session.toggle_favorite(&c.id).map(|_| ()).map_err(Into::into)
                }),
                "" => Ok(()),
                other => Err(anyhow!("Unknown command: {other}")),
            };
            if let Err(e) = result {
                eprintln!("{}", format!("❌ {e}").red());
            }
            session.sync();
        }
        Ok(())
    }

    fn run_bulk(&self, session: &mut ContactsSession<'_, SqliteStorage>, arg: &str) -> Result<()> {
        let action = match arg.split_once(' ') {
            Some(("group", gid)) => BulkAction::AddToGroup(self.resolve_group(gid.trim())?),
            _ => match arg {
                "favorite" => BulkAction::Favorite,
                "archive" => BulkAction::Archive,
                "delete" => BulkAction::Delete,
                other => bail!("unknown bulk action '{other}'"),
            },
        };
        match session.apply_bulk(action, |prompt| self.confirm(prompt))? {
            BulkOutcome::Applied(n) => println!("{}", format!("Updated {n} contact(s)").green()),
            BulkOutcome::Cancelled => println!("Cancelled."),
            BulkOutcome::NothingSelected => println!("Nothing selected. Use 'select <id>' first."),
        }
        Ok(())
    }

    fn print_help() {
        println!("Commands:");
        println!("  help                    Show this help");
        println!("  ls | list               List contacts for the current view/search/tag");
        println!("  view <all|favorites|groups|archives>");
        println!("  search <term>           Filter by name, email or phone (empty clears)");
        println!("  tag <tag|all>           Filter by tag: {}", KNOWN_TAGS.join(", "));
        println!("  select <id>             Toggle a contact in the selection");
        println!("  bulk <favorite|archive|delete|group <id>>");
        println!("  fav <id>                Toggle favorite");
        println!("  quit                    Exit");
    }
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_contact(contact: &Contact) {
    let star = if contact.is_favorite { "★".yellow() } else { " ".normal() };
    println!("{} {} ({})", star, contact.name.bold(), short(&contact.id));
    println!("  ✉️  {}", contact.email);
    println!("  📞 {}", contact.phone);
    println!("  🏷  {}", contact.tags.join(", "));
    if contact.is_archived {
        println!("  {}", "archived".dimmed());
    }
    println!();
}

fn main() -> Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    let seed = if cli.no_seed { SeedSource::Empty } else { SeedSource::Bundled };
    let app = ContactsCli::open(data_dir, seed, cli.yes)?;

    match cli.command {
        Some(Commands::Interactive) | None => app.interactive_mode()?,
        Some(Commands::List { view, search, tag }) => {
            app.list(&ViewQuery::new(view).search(search).tag(tag.as_str()))
        }
        Some(Commands::Add { name, email, phone, tags }) => {
            app.add(NewContact { name, email, phone, tags })?
        }
        Some(Commands::Favorite { id }) => app.favorite(&id)?,
        Some(Commands::Archive { ids, undo }) => app.archive(&ids, undo)?,
        Some(Commands::Delete { ids }) => app.delete(&ids)?,
        Some(Commands::Groups) => app.groups(),
        Some(Commands::CreateGroup { name, description }) => app.create_group(name, description)?,
        Some(Commands::DeleteGroup { id }) => app.delete_group(&id)?,
        Some(Commands::AddToGroup { group_id, ids }) => app.add_to_group(&group_id, &ids)?,
        Some(Commands::RemoveFromGroup { id }) => app.remove_from_group(&id)?,
    }

    Ok(())
}
