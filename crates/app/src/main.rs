use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{
    CollectionId, ItemId, Member, MemberId, QuizItem, QuizSettings, QuizVariant,
};
use services::{AppServices, Clock, ItemSourceConfig, QuizLoopService};
use storage::{ApiConfig, InMemoryRepository, ItemRequest};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::views::{render_screen, render_summary};
use ui::vm::{QuizIntent, QuizOutcome, QuizVm};
use ui::{UiApp, ViewState, build_app_context, view_state_from_load};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidVariant { raw: String },
    InvalidId { flag: &'static str, raw: String },
    ConflictingSources,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidVariant { raw } => write!(f, "invalid --variant value: {raw}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::ConflictingSources => write!(f, "use either --api or --items, not both"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_id(flag: &'static str, raw: &str) -> Result<u64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidId {
        flag,
        raw: raw.to_owned(),
    })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  quiz [--api <url> | --items <file>] [--variant word|expression|grammar] \
         [--collection <id>] [--member <id>] [--shuffle]"
    );
    eprintln!();
    eprintln!("Without --api or --items a small built-in practice set is used.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_API_TOKEN, QUIZ_ITEMS_FILE, QUIZ_VARIANT,");
    eprintln!("  QUIZ_COLLECTION, QUIZ_MEMBER, RUST_LOG");
    eprintln!();
    eprintln!("While answering:");
    eprintln!("  :hint :next :prev :final :retry :restart :undo :quit");
    eprintln!("  grammar items take chip numbers, e.g. `2 3 1`");
}

struct Args {
    api: Option<ApiConfig>,
    items: Option<PathBuf>,
    variant: QuizVariant,
    collection: CollectionId,
    member: Option<MemberId>,
    shuffle: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::from_env()?;
        let mut api_flag = false;
        let mut items_flag = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    let value = require_value(args, "--api")?;
                    let token = parsed.api.take().and_then(|config| config.token);
                    let mut config = ApiConfig::new(value);
                    config.token = token;
                    parsed.api = Some(config);
                    api_flag = true;
                }
                "--items" => {
                    parsed.items = Some(PathBuf::from(require_value(args, "--items")?));
                    items_flag = true;
                }
                "--variant" => {
                    let value = require_value(args, "--variant")?;
                    parsed.variant = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidVariant { raw: value.clone() })?;
                }
                "--collection" => {
                    let value = require_value(args, "--collection")?;
                    parsed.collection = CollectionId::new(parse_id("--collection", &value)?);
                }
                "--member" => {
                    let value = require_value(args, "--member")?;
                    parsed.member = Some(MemberId::new(parse_id("--member", &value)?));
                }
                "--shuffle" => parsed.shuffle = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // Flags win over the environment; two flags at once are a mistake.
        match (api_flag, items_flag) {
            (true, true) => return Err(ArgsError::ConflictingSources),
            (true, false) => parsed.items = None,
            (false, true) => parsed.api = None,
            (false, false) if parsed.api.is_some() && parsed.items.is_some() => {
                return Err(ArgsError::ConflictingSources);
            }
            _ => {}
        }
        Ok(parsed)
    }

    fn from_env() -> Result<Self, ArgsError> {
        let variant = match std::env::var("QUIZ_VARIANT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ArgsError::InvalidVariant { raw: raw.clone() })?,
            Err(_) => QuizVariant::Word,
        };
        let collection = match std::env::var("QUIZ_COLLECTION") {
            Ok(raw) => CollectionId::new(parse_id("QUIZ_COLLECTION", &raw)?),
            Err(_) => CollectionId::new(1),
        };
        let member = match std::env::var("QUIZ_MEMBER") {
            Ok(raw) => Some(MemberId::new(parse_id("QUIZ_MEMBER", &raw)?)),
            Err(_) => None,
        };
        Ok(Self {
            api: ApiConfig::from_env(),
            items: std::env::var_os("QUIZ_ITEMS_FILE").map(PathBuf::from),
            variant,
            collection,
            member,
            shuffle: false,
        })
    }

    fn request(&self) -> ItemRequest {
        ItemRequest::new(self.variant, self.collection)
    }

    fn member(&self) -> Member {
        self.member.map_or_else(Member::guest, |id| {
            Member::new(id, format!("member {id}"))
        })
    }

    fn source(&self) -> Result<ItemSourceConfig, Box<dyn std::error::Error>> {
        if let Some(config) = &self.api {
            return Ok(ItemSourceConfig::Http(config.clone()));
        }
        if let Some(path) = &self.items {
            return Ok(ItemSourceConfig::File(path.clone()));
        }
        let repo = InMemoryRepository::new();
        for variant in QuizVariant::ALL {
            repo.put_items(
                ItemRequest::new(variant, self.collection),
                practice_items(variant)?,
            )?;
        }
        Ok(ItemSourceConfig::InMemory(repo))
    }
}

/// Built-in items used when no source is configured.
fn practice_items(variant: QuizVariant) -> Result<Vec<QuizItem>, Box<dyn std::error::Error>> {
    let items = match variant {
        QuizVariant::Word => vec![
            QuizItem::blank(ItemId::new(1), "사과", "apple")?.with_meaning("a round fruit"),
            QuizItem::blank(ItemId::new(2), "도서관", "library")?,
            QuizItem::blank(ItemId::new(3), "바다", "sea")?,
        ],
        QuizVariant::Expression => vec![
            QuizItem::phrase(
                ItemId::new(11),
                "Don't ___ ___ now!",
                vec!["give".into(), "up".into()],
            )?
            .with_translation("지금 포기하지 마!"),
            QuizItem::blank(ItemId::new(12), "I'll ___ you back.", "call")?,
        ],
        QuizVariant::Grammar => vec![
            QuizItem::sentence(
                ItemId::new(21),
                "Arrange:",
                vec!["She".into(), "has".into(), "finished".into()],
                vec!["finished".into(), "She".into(), "has".into()],
            )?
            .with_translation("그녀는 끝냈다"),
            QuizItem::sentence(
                ItemId::new(22),
                "Arrange:",
                vec!["Where".into(), "are".into(), "you".into(), "going?".into()],
                vec!["you".into(), "going?".into(), "Where".into(), "are".into()],
            )?,
        ],
    };
    Ok(items)
}

struct ConsoleApp {
    member: Member,
    quiz_loop: Arc<QuizLoopService>,
}

impl UiApp for ConsoleApp {
    fn member(&self) -> Member {
        self.member.clone()
    }

    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Intent(QuizIntent),
    Quit,
    Empty,
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "" => Self::Empty,
            ":quit" | ":q" => Self::Quit,
            ":hint" => Self::Intent(QuizIntent::Hint),
            ":next" => Self::Intent(QuizIntent::Next),
            ":prev" => Self::Intent(QuizIntent::Prev),
            ":final" => Self::Intent(QuizIntent::Finalize),
            ":retry" => Self::Intent(QuizIntent::RetryIncorrect),
            ":restart" => Self::Intent(QuizIntent::RestartAll),
            ":undo" => Self::Intent(QuizIntent::UndoChoice),
            answer => Self::Intent(QuizIntent::Answer(answer.to_owned())),
        }
    }
}

fn show(vm: &QuizVm) {
    match vm.summary() {
        Some(summary) if vm.screen().is_complete => print!("{}", render_summary(&summary)),
        _ => print!("{}", render_screen(&vm.screen())),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = AppServices::new(args.source()?, Clock::system());
    let app: Arc<dyn UiApp> = Arc::new(ConsoleApp {
        member: args.member(),
        quiz_loop: services.quiz_loop(),
    });
    let context = build_app_context(&app);

    let settings = QuizSettings::for_variant(args.variant).with_shuffle_items(args.shuffle);
    let pending = context
        .quiz_loop()
        .spawn_session(context.member().clone(), args.request(), settings);
    let mut state = ViewState::Loading;
    if let Some(line) = state.status_line() {
        println!("{} quiz: {line}", args.variant);
    }

    state = view_state_from_load(pending.wait().await);
    if let Some(line) = state.status_line() {
        println!("{line}");
    }
    let ViewState::Ready(session) = state else {
        return Ok(());
    };
    info!(session = %session.id(), items = session.items().len(), "quiz ready");

    let (mut vm, mut resets) = QuizVm::new(&context, session);
    show(&vm);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Line::parse(&line) {
                    Line::Quit => break,
                    Line::Empty => continue,
                    Line::Intent(intent) => {
                        if vm.dispatch(intent) == QuizOutcome::Completed {
                            info!(member = %context.member().id(), "quiz finished");
                        }
                        show(&vm);
                    }
                }
            }
            Some(ticket) = resets.recv() => {
                if vm.on_reset(ticket) {
                    show(&vm);
                }
            }
        }
    }

    vm.flush().await;
    if let Some(local) = services.local_results() {
        let stored = local.results()?;
        info!(results = stored.len(), "results kept locally");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
