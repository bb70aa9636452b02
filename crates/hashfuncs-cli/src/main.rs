use std::ffi::OsString;
use std::io::{self, Write};

use hashfuncs::{
    ColumnBatch, DispatchConfig, FunctionCatalog, HashEngine, HashError, HashOutput, ScalarType,
    ScalarValue,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";
const VERBOSE_LOG_FILTER: &str = "hashfuncs=debug,hashfuncs_vector=debug,info";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    function: Option<String>,
    values: Vec<String>,
    scalar_type: ScalarType,
    seed: Option<String>,
    config_path: Option<String>,
    hex: bool,
    list: bool,
    verbose: bool,
    show_help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            function: None,
            values: Vec::new(),
            scalar_type: ScalarType::Text,
            seed: None,
            config_path: None,
            hex: false,
            list: false,
            verbose: false,
            show_help: false,
        }
    }
}

fn main() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    if options.show_help {
        if write_usage(out).is_err() {
            return 1;
        }
        return 0;
    }

    init_logging(options.verbose);

    let catalog = match build_engine(options.config_path.as_deref()) {
        Ok(engine) => FunctionCatalog::with_engine(engine),
        Err(error) => return report(&error, err),
    };

    if options.list {
        return match write_catalog(&catalog, out) {
            Ok(()) => 0,
            Err(_) => 1,
        };
    }

    let output = match hash_values(&catalog, &options) {
        Ok(output) => output,
        Err(error) => return report(&error, err),
    };

    match write_output(&output, options.hex, out) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let mut options = CliOptions::default();
    let mut positional_only = false;

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy();
        let arg_str = arg.as_ref();

        if positional_only || !arg_str.starts_with("--") || arg_str == "--" {
            if arg_str == "--" && !positional_only {
                positional_only = true;
            } else if options.function.is_none() {
                options.function = Some(arg_str.to_owned());
            } else {
                options.values.push(arg_str.to_owned());
            }
            continue;
        }

        let (flag, inline) = match arg_str.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_owned())),
            None => (arg_str, None),
        };

        match flag {
            "--help" => options.show_help = true,
            "--hex" => options.hex = true,
            "--list" => options.list = true,
            "--verbose" => options.verbose = true,
            "--type" => {
                let name = take_value(flag, inline, &mut iter)?;
                options.scalar_type = name
                    .parse()
                    .map_err(|_| format!("unknown type `{name}` for `--type`"))?;
            }
            "--seed" => {
                if options.seed.is_some() {
                    return Err(String::from("`--seed` may only be provided once"));
                }
                options.seed = Some(take_value(flag, inline, &mut iter)?);
            }
            "--config" => {
                options.config_path = Some(take_value(flag, inline, &mut iter)?);
            }
            _ => return Err(format!("unknown option `{arg_str}`")),
        }
    }

    if options.function.is_none() && !options.list && !options.show_help {
        return Err(String::from("missing FUNCTION argument"));
    }

    Ok(options)
}

fn take_value<I>(flag: &str, inline: Option<String>, iter: &mut I) -> Result<String, String>
where
    I: Iterator<Item = OsString>,
{
    if let Some(value) = inline {
        return Ok(value);
    }
    iter.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| format!("missing value for `{flag}`"))
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

fn build_engine(config_path: Option<&str>) -> hashfuncs::Result<HashEngine> {
    let Some(path) = config_path else {
        return HashEngine::from_env();
    };
    let json = std::fs::read_to_string(path)
        .map_err(|error| HashError::invalid_config(format!("cannot read {path}: {error}")))?;
    HashEngine::new(DispatchConfig::from_json(&json)?)
}

fn hash_values(catalog: &FunctionCatalog, options: &CliOptions) -> hashfuncs::Result<HashOutput> {
    let name = options.function.as_deref().unwrap_or_default();
    let function = catalog
        .find(name)
        .ok_or_else(|| HashError::UnknownFunction {
            name: name.to_owned(),
        })?;

    let values = options
        .values
        .iter()
        .map(|literal| ScalarValue::parse(options.scalar_type, literal))
        .collect::<hashfuncs::Result<Vec<_>>>()?;
    let input = ColumnBatch::from_values(options.scalar_type, &values)?;
    debug!(
        function = function.name(),
        scalar_type = %options.scalar_type,
        rows = values.len(),
        "hashing command-line values"
    );

    match &options.seed {
        Some(literal) => {
            let seed = ScalarValue::parse(function.seed_type(), literal)?;
            let seeds = ColumnBatch::constant(function.seed_type(), &seed, values.len())?;
            catalog.invoke(function.name(), &[&input, &seeds])
        }
        None => catalog.invoke(function.name(), &[&input]),
    }
}

fn report<E>(error: &HashError, err: &mut E) -> i32
where
    E: Write,
{
    let _ = writeln!(err, "error: {error}");
    if let Some(hint) = error.suggestion() {
        let _ = writeln!(err, "hint: {hint}");
    }
    error.exit_code()
}

fn write_output<W>(output: &HashOutput, hex: bool, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    for digest in output.to_vec() {
        match digest {
            Some(digest) if hex => writeln!(out, "{digest:x}")?,
            Some(digest) => writeln!(out, "{digest}")?,
            None => writeln!(out, "NULL")?,
        }
    }
    Ok(())
}

fn write_catalog<W>(catalog: &FunctionCatalog, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    for function in catalog.functions() {
        let [unseeded, seeded] = function.signatures();
        writeln!(out, "{:<40} {}", unseeded.to_string(), function.description())?;
        writeln!(out, "{seeded}")?;
    }
    Ok(())
}

fn write_usage<W>(out: &mut W) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "Usage: hashfuncs [OPTIONS] FUNCTION [VALUE...]\n\
         \n\
         Options:\n\
         \n\
         --type TYPE      Parse values as TYPE (default VARCHAR)\n\
         --seed N         Hash every value with seed N\n\
         --hex            Print digests in hexadecimal\n\
         --config FILE    Read dispatch settings from a JSON file\n\
         --list           List hash functions and their overloads\n\
         --verbose        Log dispatch decisions to stderr\n\
         --help           Show this help\n\
         \n\
         The literal NULL hashes to NULL.\n\
         \n\
         Examples:\n\
         \n\
         hashfuncs xxh64 hello world\n\
         hashfuncs --type BIGINT --seed 42 rapidhash 1 2 NULL\n\
         hashfuncs --hex murmurhash3_x64_128 -- --not-a-flag\n",
    )
}
