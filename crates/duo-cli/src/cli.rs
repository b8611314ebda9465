use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

/// Shared chores and calendar for two
#[derive(Parser, Debug)]
#[command(name = "duo", author, version, about, long_about = None)]
pub struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Couple to act on (defaults to `default_couple` from the config)
    #[arg(long, global = true)]
    pub couple: Option<Uuid>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage couples
    Couple(CoupleCommand),
    /// Manage members of a couple
    Member(MemberCommand),
    /// Manage household task definitions
    Task(TaskCommand),
    /// Manage calendar events
    Event(EventCommand),
    /// Show the tasks due on one day
    Day(DayCommand),
    /// Show calendar occurrences in a date range
    Calendar(CalendarCommand),
    /// Planned versus completed tasks for a month
    Summary(SummaryCommand),
    /// All-time completions per member
    Stats,
    /// Mark a task occurrence as done
    Done(DoneCommand),
    /// Undo a completion
    Undo(UndoCommand),
    /// Skip one occurrence of a task or event
    Skip(SkipCommand),
    /// Restore a skipped occurrence
    Unskip(UnskipCommand),
}

// ============================================================================
// Couples and members
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct CoupleCommand {
    #[command(subcommand)]
    pub command: CoupleSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CoupleSubcommand {
    /// Create a new couple
    Create(CreateCoupleCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCoupleCommand {
    /// Name of the couple
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct MemberCommand {
    #[command(subcommand)]
    pub command: MemberSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MemberSubcommand {
    /// Add a member to the couple
    Add(AddMemberCommand),
    /// List members of the couple
    List,
}

#[derive(Parser, Debug, Clone)]
pub struct AddMemberCommand {
    /// Display name of the member
    pub name: String,
}

// ============================================================================
// Definitions
// ============================================================================

/// Recurrence options shared by tasks and events
#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Raw RFC 5545 recurrence rule, e.g. 'FREQ=WEEKLY;BYDAY=MO'
    #[arg(long, conflicts_with_all = ["every", "on"])]
    pub recurrence: Option<String>,
    /// Human-friendly frequency
    #[arg(long, value_enum)]
    pub every: Option<RecurrenceShortcut>,
    /// Days of week for weekly recurrence (mon,tue,wed,thu,fri,sat,sun)
    #[arg(long, requires = "every")]
    pub on: Option<String>,
    /// Last date of the recurrence (e.g. '2025-12-31')
    #[arg(long)]
    pub until: Option<String>,
    /// Maximum number of occurrences
    #[arg(long)]
    pub count: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskSubcommand {
    /// Add a task
    Add(AddTaskCommand),
    /// Edit a task
    Edit(EditTaskCommand),
    /// Delete a task; past occurrences stay in the statistics
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddTaskCommand {
    /// Title of the task
    pub title: String,
    /// Member creating the task
    #[arg(long = "as")]
    pub author: Uuid,
    /// Description of the task
    #[arg(short, long)]
    pub description: Option<String>,
    /// First due date (defaults to today)
    #[arg(short, long)]
    pub start: Option<String>,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct EditTaskCommand {
    /// The ID of the task to edit
    pub id: Uuid,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long, help = "Replace the recurrence rule (raw RRULE)")]
    pub recurrence: Option<String>,
    #[arg(long, conflicts_with = "recurrence", help = "Remove recurrence (one-off task)")]
    pub recurrence_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the definition to delete
    pub id: Uuid,
    /// Delete without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct EventCommand {
    #[command(subcommand)]
    pub command: EventSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventSubcommand {
    /// Add a calendar event
    Add(AddEventCommand),
    /// Delete a calendar event and all its occurrences
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddEventCommand {
    /// Title of the event
    pub title: String,
    /// Member creating the event
    #[arg(long = "as")]
    pub author: Uuid,
    /// Start instant in UTC (e.g. '2025-01-15 10:00', 'tomorrow 9am')
    #[arg(long)]
    pub start: String,
    /// End instant in UTC
    #[arg(long, conflicts_with = "minutes")]
    pub end: Option<String>,
    /// Length in minutes
    #[arg(long, default_value = "60")]
    pub minutes: i64,
    /// All-day event
    #[arg(long)]
    pub all_day: bool,
    /// Category identifier
    #[arg(long)]
    pub category: Option<Uuid>,
    /// Description of the event
    #[arg(short, long)]
    pub description: Option<String>,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct DayCommand {
    /// Day to show (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CalendarCommand {
    /// First day of the range (defaults to today)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day of the range (defaults to seven days after --from)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SummaryCommand {
    /// Year, 2000 to 2100 (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
    /// Month, 1 to 12 (defaults to the current month)
    #[arg(long)]
    pub month: Option<u32>,
}

// ============================================================================
// Overlays
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct DoneCommand {
    /// The ID of the task
    pub id: Uuid,
    /// Member who did it
    #[arg(long = "as")]
    pub actor: Uuid,
    /// Due date of the occurrence (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UndoCommand {
    /// The ID of the completion
    pub id: Uuid,
    /// Member undoing it
    #[arg(long = "as")]
    pub actor: Uuid,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipCommand {
    #[command(subcommand)]
    pub command: SkipSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SkipSubcommand {
    /// Skip the task occurrence due on one day
    Task(SkipTaskCommand),
    /// Cancel the event occurrence starting at one instant
    Event(SkipEventCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct SkipTaskCommand {
    /// The ID of the task
    pub id: Uuid,
    #[arg(long = "as")]
    pub actor: Uuid,
    /// Due date of the occurrence to skip
    #[arg(long)]
    pub date: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SkipEventCommand {
    /// The ID of the event
    pub id: Uuid,
    #[arg(long = "as")]
    pub actor: Uuid,
    /// Start instant of the occurrence to cancel, in UTC
    #[arg(long)]
    pub at: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UnskipCommand {
    #[command(subcommand)]
    pub command: UnskipSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UnskipSubcommand {
    /// Remove a task exception
    Task(UnskipArgs),
    /// Remove an event exception
    Event(UnskipArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct UnskipArgs {
    /// The ID of the exception
    pub id: Uuid,
    #[arg(long = "as")]
    pub actor: Uuid,
}

/// Human-friendly recurrence patterns
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceShortcut {
    /// Every day
    Daily,
    /// Every week (same weekday, or the days given with --on)
    Weekly,
    /// Every month (same date)
    Monthly,
    /// Every year (same date)
    Yearly,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl RecurrenceShortcut {
    /// Base RRULE for the shortcut
    pub fn to_rrule(self) -> &'static str {
        match self {
            RecurrenceShortcut::Daily => "FREQ=DAILY",
            RecurrenceShortcut::Weekly => "FREQ=WEEKLY",
            RecurrenceShortcut::Monthly => "FREQ=MONTHLY",
            RecurrenceShortcut::Yearly => "FREQ=YEARLY",
            RecurrenceShortcut::Weekdays => "FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR",
            RecurrenceShortcut::Weekends => "FREQ=WEEKLY;BYDAY=SA,SU",
        }
    }
}
