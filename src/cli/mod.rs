use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "financetrack")]
#[command(version, about = "Personal finance tracker for Brazilian users")]
#[command(
    long_about = "Track income and expenses, cards and invoices, monthly and long-term goals, import bank statements (CSV, OFX, PDF), run financial calculators and talk to an AI assistant."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and seed the default categories
    Init,

    /// Import a bank statement (CSV, OFX or PDF; format auto-detected)
    Import {
        /// Path to the statement file
        file: String,

        /// Preview only, don't save to database
        #[arg(short, long)]
        dry_run: bool,

        /// Account (name) the entries belong to
        #[arg(short, long)]
        account: Option<String>,

        /// Classify entries with the AI assistant instead of keywords
        #[arg(long)]
        assistant: bool,
    },

    /// Analyze a statement without importing it
    Analyze {
        /// Path to the statement file
        file: String,

        /// Classify entries with the AI assistant instead of keywords
        #[arg(long)]
        assistant: bool,
    },

    /// Manual transaction management
    Transactions {
        #[command(subcommand)]
        action: TransactionCommands,
    },

    /// Bank accounts
    Accounts {
        #[command(subcommand)]
        action: AccountCommands,
    },

    /// Spending categories
    Categories {
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// Credit and debit cards
    Cards {
        #[command(subcommand)]
        action: CardCommands,
    },

    /// Card invoices (faturas)
    Invoices {
        #[command(subcommand)]
        action: InvoiceCommands,
    },

    /// Installment purchases (compras parceladas)
    Installments {
        #[command(subcommand)]
        action: InstallmentCommands,
    },

    /// Monthly and long-term goals
    Goals {
        #[command(subcommand)]
        action: GoalCommands,
    },

    /// Net worth: investments, property and vehicles
    Assets {
        #[command(subcommand)]
        action: AssetCommands,
    },

    /// Compound interest calculator
    Calc {
        #[command(subcommand)]
        action: CalcCommands,
    },

    /// Budget and life-event projections
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },

    /// Emergency fund plan and safety thermometer
    Emergency {
        /// Current reserve (defaults to the sum of active account balances)
        #[arg(long)]
        balance: Option<String>,

        /// Monthly fixed cost (defaults to this month's fixed expenses)
        #[arg(long)]
        monthly_cost: Option<String>,

        /// Months of cost the reserve should cover
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=1200))]
        months: u32,

        /// Explicit goal, overriding cost × months
        #[arg(long)]
        goal: Option<String>,

        /// Monthly contribution towards the reserve
        #[arg(long, default_value = "0")]
        contribution: String,
    },

    /// Monthly, annual and weekly/daily summaries
    Summary {
        #[command(subcommand)]
        action: SummaryCommands,
    },

    /// Financial month lifecycle
    Month {
        #[command(subcommand)]
        action: MonthCommands,
    },

    /// Talk to the AI assistant (`chat <text>`), or manage the history
    #[command(args_conflicts_with_subcommands = true)]
    Chat {
        #[command(subcommand)]
        action: Option<ChatCommands>,

        /// Message for the assistant
        text: Vec<String>,

        /// Save a suggested transaction without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Detect a boleto or PIX code in copied text (reads stdin when omitted)
    Clip {
        text: Option<String>,
    },

    /// Resolve a deep link into the matching command
    Link {
        url: String,
    },

    /// Open the command palette
    Palette,

    /// Launch interactive mode
    Interactive,

    /// Configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Add a transaction: kind is entrada, saida_fixa or diario
    Add {
        kind: String,
        /// Amount (accepts 1.234,56 or 1234.56)
        amount: String,
        description: String,
        /// Date (DD/MM/YYYY or YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        /// Card name or id
        #[arg(long)]
        card: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        card: Option<String>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Show one transaction
    Show { id: i64 },
    /// Delete a transaction
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    Add {
        name: String,
        #[arg(short, long)]
        bank: Option<String>,
        /// Opening balance
        #[arg(long, default_value = "0")]
        balance: String,
    },
    List {
        /// Include deactivated accounts
        #[arg(short, long)]
        all: bool,
    },
    Deactivate { name: String },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "📁")]
        icon: String,
        #[arg(long, default_value = "#6B7280")]
        color: String,
        /// fixa or variavel
        #[arg(short, long, default_value = "variavel")]
        kind: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardCommands {
    Add {
        name: String,
        /// credito, debito or ambos
        #[arg(short = 't', long = "type", default_value = "credito")]
        card_type: String,
        #[arg(short, long)]
        limit: Option<String>,
        #[arg(long)]
        closing_day: Option<u32>,
        #[arg(long)]
        due_day: Option<u32>,
        #[arg(short, long)]
        account: Option<String>,
    },
    List,
    /// Show a card's invoice
    Invoice {
        /// Card name or id
        card: String,
        /// Invoice month (YYYY-MM), defaults to the invoice open today
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InvoiceCommands {
    Pay { card: String, month: String },
    Unpay { card: String, month: String },
}

#[derive(Subcommand, Debug)]
pub enum InstallmentCommands {
    Add {
        description: String,
        /// Total purchase amount
        amount: String,
        /// Number of installments (1-12)
        count: u32,
        #[arg(long)]
        card: Option<String>,
        /// First due date, defaults to today
        #[arg(long)]
        first_due: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    List,
    Show { id: i64 },
    /// Mark an installment as paid
    Pay {
        installment_id: i64,
        /// Mark as unpaid instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    Add {
        name: String,
        /// Amount invested / paid
        initial: String,
        /// Current value (defaults to the amount invested)
        current: Option<String>,
        /// investimento, imovel, veiculo or outro
        #[arg(short = 't', long = "type", default_value = "investimento")]
        asset_type: String,
        /// Yearly yield in percent
        #[arg(short, long, default_value = "0")]
        rate: String,
        /// Still being financed, with this percent already paid
        #[arg(long)]
        financing: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    List,
    /// Revalue an asset
    Update {
        id: i64,
        current: String,
        /// Percent of the financing already paid
        #[arg(long)]
        paid: Option<String>,
    },
    Delete { id: i64 },
    /// Invested vs current totals and return
    Summary,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Monthly goals (spending caps and savings floors)
    Monthly {
        #[command(subcommand)]
        action: MonthlyGoalCommands,
    },
    /// Long-term financial goals
    Financial {
        #[command(subcommand)]
        action: FinancialGoalCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum MonthlyGoalCommands {
    Add {
        /// gasto_maximo or economia_minima
        goal_type: String,
        target: String,
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    List {
        #[arg(short, long)]
        month: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum FinancialGoalCommands {
    Add {
        name: String,
        target: String,
        /// reserva_emergencia, viagem, compra, investimento or outro
        #[arg(short = 't', long = "type", default_value = "outro")]
        goal_type: String,
        #[arg(long, default_value = "0")]
        current: String,
        #[arg(short, long)]
        deadline: Option<String>,
    },
    List,
    Contribute {
        id: i64,
        amount: String,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CalcCommands {
    /// Compound interest with monthly contributions
    Interest {
        initial: String,
        contribution: String,
        /// Monthly rate in percent (1 = 1% a month)
        rate: String,
        /// Up to 1200 months
        #[arg(value_parser = clap::value_parser!(u32).range(0..=1200))]
        months: u32,
        /// Save the simulation under this name
        #[arg(short, long)]
        save: Option<String>,
        /// Print the month-by-month evolution
        #[arg(short, long)]
        table: bool,
    },
    /// Monthly contribution needed to reach a target
    Needed {
        target: String,
        current: String,
        rate: String,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=1200))]
        months: u32,
    },
    Simulations,
    DeleteSimulation { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Simulate extra spending against this month's budget
    Budget {
        /// Monthly income (defaults to this month's income)
        #[arg(long)]
        income: Option<String>,
        /// Current spending (defaults to this month's expenses)
        #[arg(long)]
        spend: Option<String>,
        #[arg(long, default_value_t = 0)]
        trip_days: u32,
        #[arg(long, default_value = "0")]
        trip_daily: String,
        #[arg(long, default_value = "0")]
        housing: String,
        /// mensal or anual
        #[arg(long)]
        housing_frequency: Option<String>,
        #[arg(long, default_value = "0")]
        custom: String,
        #[arg(short, long)]
        save: Option<String>,
    },
    Business {
        initial: String,
        monthly_cost: String,
        monthly_revenue: String,
        #[arg(short, long)]
        save: Option<String>,
    },
    Education {
        monthly_fee: String,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=1200))]
        months: u32,
        #[arg(long, default_value = "0")]
        materials: String,
        /// Annual inflation in percent
        #[arg(long, default_value = "0")]
        inflation: String,
        #[arg(short, long)]
        save: Option<String>,
    },
    Property {
        value: String,
        down_payment: String,
        /// Annual rate in percent
        rate: String,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        years: u32,
        #[arg(long)]
        rent: Option<String>,
        #[arg(short, long)]
        save: Option<String>,
    },
    Retirement {
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=130))]
        age: u32,
        #[arg(long, default_value_t = 65, value_parser = clap::value_parser!(u32).range(0..=130))]
        retire_at: u32,
        #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(0..=130))]
        life_expectancy: u32,
        #[arg(long, default_value = "0")]
        wealth: String,
        #[arg(long, default_value = "0")]
        contribution: String,
        /// Annual return in percent
        #[arg(long, default_value = "6")]
        return_pct: String,
        #[arg(long, default_value = "5000")]
        spend: String,
        #[arg(short, long)]
        save: Option<String>,
    },
    List,
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum SummaryCommands {
    Month {
        /// YYYY-MM, defaults to the current month
        month: Option<String>,
        /// Months to step from it (-1 = the month before)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true,
              value_parser = clap::value_parser!(i32).range(-1200..=1200))]
        offset: i32,
    },
    /// Totals for a week or a day (or a month) around a date
    Period {
        /// mes, semana or dia
        #[arg(short, long, default_value = "semana")]
        period: String,
        /// Reference date, today when absent
        #[arg(short, long)]
        date: Option<String>,
        /// Periods to step from the reference date
        #[arg(long, default_value_t = 0, allow_negative_numbers = true,
              value_parser = clap::value_parser!(i32).range(-3650..=3650))]
        offset: i32,
    },
    Year {
        year: Option<i32>,
        /// How many top categories to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum MonthCommands {
    /// Create the month if missing
    Ensure { month: Option<String> },
    /// Close a month, storing its totals
    Close { month: String },
    History {
        #[arg(short, long, default_value_t = 12)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Show,
    Path,
    /// Store the assistant API key in the config file
    SetKey { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transaction_add() {
        let cli = Cli::try_parse_from([
            "financetrack",
            "transactions",
            "add",
            "diario",
            "45,90",
            "Almoço",
            "--category",
            "Alimentação",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Transactions {
                action: TransactionCommands::Add { kind, amount, category, .. },
            }) => {
                assert_eq!(kind, "diario");
                assert_eq!(amount, "45,90");
                assert_eq!(category.as_deref(), Some("Alimentação"));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn chat_text_and_history_subcommand() {
        let cli = Cli::try_parse_from(["financetrack", "chat", "gastei", "50", "no", "mercado"]).unwrap();
        match cli.command {
            Some(Commands::Chat { action: None, text, yes: false }) => assert_eq!(text.join(" "), "gastei 50 no mercado"),
            other => panic!("unexpected parse: {:?}", other),
        }

        let cli = Cli::try_parse_from(["financetrack", "chat", "history", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Chat {
                action: Some(ChatCommands::History { limit: 5 }),
                ..
            })
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["financetrack", "summary", "month", "2025-03", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn summary_offsets_accept_negative_numbers() {
        let cli = Cli::try_parse_from(["financetrack", "summary", "month", "--offset", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Summary { action: SummaryCommands::Month { month: None, offset: -1 } })
        ));

        let cli = Cli::try_parse_from(["financetrack", "summary", "period", "-p", "dia", "--offset", "-3"]).unwrap();
        match cli.command {
            Some(Commands::Summary {
                action: SummaryCommands::Period { period, date, offset },
            }) => {
                assert_eq!(period, "dia");
                assert_eq!(date, None);
                assert_eq!(offset, -3);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn simulation_horizons_are_bounded() {
        assert!(Cli::try_parse_from(["financetrack", "calc", "interest", "1000", "100", "1", "1200"]).is_ok());
        assert!(Cli::try_parse_from(["financetrack", "calc", "interest", "1000", "100", "1", "1201"]).is_err());
        assert!(Cli::try_parse_from(["financetrack", "calc", "needed", "1000", "0", "1", "99999"]).is_err());
        assert!(Cli::try_parse_from(["financetrack", "project", "property", "500000", "0", "10", "101"]).is_err());
        assert!(Cli::try_parse_from(["financetrack", "project", "retirement", "--retire-at", "500"]).is_err());
    }

    #[test]
    fn parses_asset_add_with_type_and_financing() {
        let cli = Cli::try_parse_from([
            "financetrack", "assets", "add", "Apartamento", "400000", "450000", "--type", "imovel", "--financing", "35",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Assets {
                action: AssetCommands::Add { name, current, asset_type, financing, .. },
            }) => {
                assert_eq!(name, "Apartamento");
                assert_eq!(current.as_deref(), Some("450000"));
                assert_eq!(asset_type, "imovel");
                assert_eq!(financing.as_deref(), Some("35"));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }
}
