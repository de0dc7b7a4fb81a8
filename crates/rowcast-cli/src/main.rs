//! rowcast command-line interface
//!
//! Plans SELECT statements from structured flags and materializes recorded
//! result sets the way a session would.
//!
//! # Usage
//!
//! ```bash
//! # Print the statement for a structured query
//! rowcast --dialect mssql plan --table user --where "age > ?" --arg 30 --limit 10 --offset 20
//!
//! # Show a recorded result set as string maps, reordered
//! rowcast show users.json --select 2,0 -o json
//!
//! # Stream a recorded result set to a TSV file
//! rowcast export users.json --tsv --out users.tsv
//!
//! # Write the effective settings to the default config file
//! rowcast --dialect postgres config init
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod fixture;
mod formatter;

use config::CliConfig;
use formatter::{format_output, Output, OutputFormat};
use rowcast_common::config::{Dialect, LineTerminator};
use rowcast_common::RowcastError;
use rowcast_core::connection::MemoryConnection;
use rowcast_core::cursor::ResultSet;
use rowcast_core::export::DelimitedWriter;
use rowcast_core::session::Session;
use rowcast_core::statement::Cond;

/// rowcast command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "rowcast",
    version,
    about = "Plan SELECT statements and materialize recorded result sets"
)]
struct Args {
    /// SQL dialect (mysql, postgres, sqlite, mssql)
    #[arg(short = 'd', long, env = "ROWCAST_DIALECT")]
    dialect: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the SQL and arguments a structured query resolves to
    Plan(PlanArgs),
    /// Materialize a recorded result set and print it
    Show(ShowArgs),
    /// Stream a recorded result set as delimited text
    Export(ExportArgs),
    /// Inspect or write the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Write the effective configuration to a file
    Init {
        /// Target file (defaults to the user config path)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct PlanArgs {
    /// Table to select from
    #[arg(short = 't', long)]
    table: Option<String>,

    /// Comma-separated projection
    #[arg(long)]
    cols: Option<String>,

    /// Raw select expression
    #[arg(long)]
    select: Option<String>,

    /// Join as OPERATOR:TABLE:ON, e.g. "inner:dept:user.dept_id = dept.id"
    #[arg(long = "join", value_name = "JOIN")]
    joins: Vec<String>,

    /// Raw WHERE fragment with `?` placeholders
    #[arg(short = 'w', long = "where")]
    condition: Option<String>,

    /// Positional argument for the WHERE fragment (repeatable)
    #[arg(short = 'a', long = "arg")]
    args: Vec<String>,

    /// GROUP BY column list
    #[arg(long)]
    group_by: Option<String>,

    /// HAVING fragment
    #[arg(long)]
    having: Option<String>,

    /// ORDER BY entry (repeatable)
    #[arg(long)]
    order_by: Vec<String>,

    /// Mapped record columns, comma-separated
    #[arg(long)]
    mapped: Option<String>,

    /// Primary key columns, comma-separated
    #[arg(long)]
    pk: Option<String>,

    /// Primary key value (repeatable, one per key)
    #[arg(long = "id")]
    ids: Vec<String>,

    /// Row limit
    #[arg(long)]
    limit: Option<u64>,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// Lock selected rows
    #[arg(long)]
    for_update: bool,
}

/// Row shape for `show`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Column name to text
    Strings,
    /// Text values in column order
    Slices,
    /// Column name to unconverted value
    Values,
    /// Column name to bytes
    Bytes,
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct ShowArgs {
    /// Fixture file (JSON)
    fixture: PathBuf,

    /// Row shape
    #[arg(short = 'm', long, value_enum, default_value = "strings")]
    mode: Mode,

    /// Column indices to emit, in order (string mode only)
    #[arg(short = 's', long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Output format (defaults to the configured format)
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,
}

#[derive(ClapArgs, Debug)]
struct ExportArgs {
    /// Fixture file (JSON)
    fixture: PathBuf,

    /// Column indices to emit, in order
    #[arg(short = 's', long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Output file (stdout if omitted)
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Tab-separated output
    #[arg(long)]
    tsv: bool,

    /// Terminate records with CRLF
    #[arg(long)]
    crlf: bool,

    /// Quote every field
    #[arg(long)]
    quote_all: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// Prefixes library errors with their category and stable code.
fn error_report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RowcastError>() {
        Some(e) => {
            let code = e.code();
            format!("Error [{} {:#06x}]: {err:#}", code.category(), code.as_u16())
        }
        None => format!("Error: {err:#}"),
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;

    match args.command {
        Command::Plan(plan) => run_plan(&config, &plan),
        Command::Show(show) => run_show(&config, &show),
        Command::Export(export) => run_export(&config, &export),
        Command::Config(command) => run_config(&config, &command),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rowcast=debug,rowcast_core=debug")
    } else {
        EnvFilter::new("rowcast=warn,rowcast_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = if let Some(path) = &args.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::load_default()?
    };

    if let Some(name) = &args.dialect {
        config.dialect = Dialect::from_name(name)
            .with_context(|| format!("unknown dialect `{name}`"))?;
    }

    Ok(config)
}

fn open_session(config: &CliConfig, set: ResultSet) -> Result<Session<MemoryConnection>> {
    let connection = MemoryConnection::new().with_result(set);
    Ok(Session::with_config(connection, config.session_config())?)
}

/// Builds the session state from plan flags.
fn apply_plan(session: &mut Session<MemoryConnection>, plan: &PlanArgs) -> Result<()> {
    if let Some(table) = &plan.table {
        session.table(table.as_str());
    }
    if let Some(cols) = &plan.cols {
        session.cols(split_list(cols));
    }
    if let Some(select) = &plan.select {
        session.select(select.as_str());
    }
    for join in &plan.joins {
        let mut parts = join.splitn(3, ':');
        let (Some(operator), Some(table), Some(on)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("join must be OPERATOR:TABLE:ON, got `{join}`");
        };
        session.join(operator, table, on, Vec::new());
    }
    let args: Vec<_> = plan.args.iter().map(|a| fixture::parse_literal(a)).collect();
    match &plan.condition {
        Some(condition) => {
            session.and_where(Cond::expr(condition.as_str(), args));
        }
        None if !args.is_empty() => bail!("--arg requires --where"),
        None => {}
    }
    if let Some(group_by) = &plan.group_by {
        session.group_by(group_by.as_str());
    }
    if let Some(having) = &plan.having {
        session.having(having.as_str());
    }
    for order in &plan.order_by {
        session.order_by(order.as_str());
    }
    let mapped = plan.mapped.as_deref().map(split_list).unwrap_or_default();
    let pks = plan.pk.as_deref().map(split_list).unwrap_or_default();
    if !mapped.is_empty() || !pks.is_empty() {
        session.mapping(mapped, pks);
    }
    if !plan.ids.is_empty() {
        session.id(plan.ids.iter().map(|v| fixture::parse_literal(v)));
    }
    match plan.limit {
        Some(limit) => {
            session.limit(limit, plan.offset);
        }
        None if plan.offset > 0 => bail!("--offset requires --limit"),
        None => {}
    }
    if plan.for_update {
        session.for_update();
    }
    Ok(())
}

fn run_plan(config: &CliConfig, plan: &PlanArgs) -> Result<()> {
    let mut session = open_session(config, ResultSet::default())?;
    apply_plan(&mut session, plan)?;
    let statement = session.plan(())?;
    info!(origin = ?statement.origin, "Planned statement");

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", statement.sql)?;
    for (i, arg) in statement.args.iter().enumerate() {
        let text = rowcast_core::convert(arg).unwrap_or_else(|_| String::from("?"));
        writeln!(stdout, "  ${} = {} ({})", i + 1, text, arg.kind_name())?;
    }
    Ok(())
}

fn fixture_sql(path: &Path) -> String {
    let name = path
        .file_stem()
        .map_or_else(|| "fixture".to_string(), |s| s.to_string_lossy().into_owned());
    format!("SELECT * FROM {name}")
}

fn run_show(config: &CliConfig, show: &ShowArgs) -> Result<()> {
    let set = fixture::load(&show.fixture)?;
    let columns = set.columns().to_vec();
    let mut session = open_session(config, set)?;
    let sql = fixture_sql(&show.fixture);

    let output = if show.select.is_empty() {
        match show.mode {
            Mode::Strings => Output::from_string_maps(columns, session.query_string(sql)?),
            Mode::Slices => Output::from_slices(columns, session.query_slice_string(sql)?),
            Mode::Values => Output::from_value_maps(columns, session.query_value(sql)?),
            Mode::Bytes => Output::from_byte_maps(columns, session.query(sql)?),
        }
    } else {
        if !matches!(show.mode, Mode::Strings) {
            bail!("--select is only supported in strings mode");
        }
        Output::from_ordered(session.query_ordered(sql, &show.select)?)
    };

    let format = match show.output {
        Some(arg) => arg.into(),
        None => OutputFormat::from_name(&config.output_format)
            .with_context(|| format!("unknown output format `{}`", config.output_format))?,
    };
    println!("{}", format_output(&output, format));
    Ok(())
}

fn run_export(config: &CliConfig, export: &ExportArgs) -> Result<()> {
    let mut export_config = config.export.clone();
    if export.tsv {
        export_config.delimiter = '\t';
    }
    if export.crlf {
        export_config.line_terminator = LineTerminator::Crlf;
    }
    if export.quote_all {
        export_config.quote_all = true;
    }
    if let Err(e) = export_config.validate() {
        bail!("invalid export settings: {e}");
    }

    let set = fixture::load(&export.fixture)?;
    let mut session = open_session(config, set)?;
    let sql = fixture_sql(&export.fixture);

    let target: Box<dyn Write> = match &export.out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = DelimitedWriter::with_config(target, export_config);
    let count = session.export_query(sql, &mut writer, &export.select)?;
    writer.into_inner()?.flush()?;

    info!(rows = count, "Export complete");
    eprintln!("{count} rows exported");
    Ok(())
}

fn run_config(config: &CliConfig, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init { path, force } => {
            let path = match path {
                Some(path) => path.clone(),
                None => CliConfig::default_config_path()
                    .context("no user config directory on this platform")?,
            };
            init_config(config, &path, *force)?;
            eprintln!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn init_config(config: &CliConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.save(path)?;
    info!(path = %path.display(), "Saved configuration");
    Ok(())
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(argv: &[&str]) -> Result<rowcast_core::Statement> {
        let mut full = vec!["rowcast"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full)?;
        let mut config = CliConfig::default();
        if let Some(name) = &args.dialect {
            config.dialect = Dialect::from_name(name).context("dialect")?;
        }
        let Command::Plan(plan_args) = args.command else {
            bail!("not a plan command");
        };
        let mut session = open_session(&config, ResultSet::default())?;
        apply_plan(&mut session, &plan_args)?;
        Ok(session.plan(())?)
    }

    #[test]
    fn test_plan_structured() {
        let statement = plan(&[
            "plan", "--table", "user", "--mapped", "id,name", "--pk", "id", "--where",
            "age > ?", "--arg", "30", "--order-by", "id", "--limit", "10",
        ])
        .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT `id`, `name` FROM `user` WHERE age > ? ORDER BY id LIMIT 10"
        );
        assert_eq!(statement.args.len(), 1);
    }

    #[test]
    fn test_plan_mssql_paging_doubles_args() {
        let statement = plan(&[
            "-d", "mssql", "plan", "-t", "user", "--pk", "id", "-w", "age > ?", "-a", "30",
            "--limit", "10", "--offset", "20",
        ])
        .unwrap();
        assert_eq!(statement.args.len(), 2);
    }

    #[test]
    fn test_plan_join() {
        let statement = plan(&[
            "plan", "-t", "user", "--mapped", "id,name", "--join",
            "inner:dept:user.dept_id = dept.id",
        ])
        .unwrap();
        assert!(statement.sql.starts_with("SELECT * FROM `user` INNER JOIN dept ON"));
    }

    #[test]
    fn test_plan_flag_errors() {
        assert!(plan(&["plan", "-t", "user", "--arg", "1"]).is_err());
        assert!(plan(&["plan", "-t", "user", "--offset", "5"]).is_err());
        assert!(plan(&["plan", "-t", "user", "--join", "inner:dept"]).is_err());
        assert!(plan(&["plan"]).is_err());
    }

    #[test]
    fn test_show_join_fixture_with_duplicate_columns() {
        let set = fixture::parse(r#"{"columns": ["id", "id", "name"], "rows": [[1, 10, "ann"]]}"#)
            .unwrap();
        let columns = set.columns().to_vec();
        let mut session = open_session(&CliConfig::default(), set).unwrap();
        let rows = session.query_string("SELECT * FROM joined").unwrap();

        let output = Output::from_string_maps(columns, rows);
        let json = format_output(&output, OutputFormat::Json);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], "10");
        assert_eq!(parsed[0]["name"], "ann");
    }

    #[test]
    fn test_error_report() {
        let err = plan(&["plan"]).unwrap_err();
        assert_eq!(
            error_report(&err),
            "Error [Statement 0x0100]: table not found: no table or source name set for the query"
        );

        let err = anyhow::anyhow!("bad fixture");
        assert_eq!(error_report(&err), "Error: bad fixture");
    }

    #[test]
    fn test_fixture_sql() {
        assert_eq!(fixture_sql(Path::new("/tmp/users.json")), "SELECT * FROM users");
    }

    #[test]
    fn test_config_init() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("rowcast").join("config.toml");

        let args = Args::try_parse_from(["rowcast", "-d", "sqlite", "config", "init"]).unwrap();
        assert!(matches!(args.command, Command::Config(ConfigCommand::Init { .. })));
        let config = CliConfig {
            dialect: Dialect::Sqlite,
            ..CliConfig::default()
        };

        init_config(&config, &path, false).unwrap();
        assert_eq!(CliConfig::from_file(&path).unwrap(), config);

        assert!(init_config(&CliConfig::default(), &path, false).is_err());
        init_config(&CliConfig::default(), &path, true).unwrap();
        assert_eq!(CliConfig::from_file(&path).unwrap().dialect, Dialect::Mysql);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, b ,,c"), vec!["a", "b", "c"]);
    }
}
