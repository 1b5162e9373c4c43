use crate::mixture::Contributor;
use crate::utils::{AxisScale, Result};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| env!("CARGO_PKG_VERSION").to_string());

#[derive(Parser)]
#[command(name="mixsim",
          version=&**FULL_VERSION,
          about="Deterministic CE and NGS signal simulator for forensic STR mixtures",
          long_about = None,
          disable_help_subcommand = true,
          after_help = "Simulated signal only; not for use in casework or validation.",
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Simulate a capillary electrophoresis profile for one locus")]
    Ce(CeArgs),
    #[clap(about = "Simulate NGS read counts for one locus")]
    Ngs(NgsArgs),
    #[clap(about = "Assemble a two-person mixture from a marker allele catalog")]
    Catalog(CatalogArgs),
    #[clap(about = "List the locus models")]
    Loci(LociArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("ce")))]
#[command(arg_required_else_help(true))]
pub struct CeArgs {
    #[clap(required = true)]
    #[clap(short = 'l')]
    #[clap(long = "locus")]
    #[clap(help = "Locus id (unknown ids use the default model)")]
    #[clap(value_name = "LOCUS")]
    pub locus: String,

    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "contributor")]
    #[clap(help = "Contributor as LABEL[:SAMPLE]:PROPORTION:ALLELE,ALLELE (repeatable)")]
    #[clap(value_name = "CONTRIBUTOR")]
    #[arg(value_parser = parse_contributor)]
    pub contributors: Vec<Contributor>,

    #[clap(short = 'd')]
    #[clap(long = "dna")]
    #[clap(help = "Total DNA input in ng")]
    #[clap(value_name = "NG")]
    #[clap(default_value = "0.5")]
    #[arg(value_parser = ensure_dna_input)]
    pub dna_input: f64,

    #[clap(long = "at")]
    #[clap(help = "Analytical threshold in RFU")]
    #[clap(value_name = "RFU")]
    #[clap(default_value = "50")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub analytical_threshold: f64,

    #[clap(long = "st")]
    #[clap(help = "Stochastic threshold in RFU")]
    #[clap(value_name = "RFU")]
    #[clap(default_value = "200")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub stochastic_threshold: f64,

    #[clap(short = 's')]
    #[clap(long = "seed")]
    #[clap(help = "Seed mixed into every draw")]
    #[clap(value_name = "SEED")]
    #[clap(default_value = "0")]
    pub seed: u64,

    #[clap(long = "trace")]
    #[clap(help = "Print the rendered trace instead of the peak table")]
    pub trace: bool,

    #[clap(long = "axis")]
    #[clap(value_name = "SCALE")]
    #[clap(help = "Intensity axis of the rendered trace (linear or log)")]
    #[clap(default_value = "linear")]
    pub axis: AxisScale,

    #[clap(long = "loci")]
    #[clap(help = "Locus model table layered over the built-in models")]
    #[clap(value_name = "LOCI")]
    #[arg(value_parser = check_file_exists)]
    pub loci_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(short = 'k')]
    #[clap(long = "degradation")]
    #[clap(help = "Degradation coefficient (0 disables degradation)")]
    #[clap(value_name = "K")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub degradation: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "baseline")]
    #[clap(help = "Mean baseline noise in RFU")]
    #[clap(value_name = "RFU")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub baseline_mean: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "baseline-sd")]
    #[clap(help = "Standard deviation of baseline noise in RFU")]
    #[clap(value_name = "RFU")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub baseline_sd: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "stutter-scale")]
    #[clap(help = "Multiplier on every stutter rate (0 disables stutter)")]
    #[clap(value_name = "SCALE")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub stutter_scale: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "kappa")]
    #[clap(help = "RFU per ng of template")]
    #[clap(value_name = "KAPPA")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub kappa: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "lognormal-sigma")]
    #[clap(help = "Sigma of the per-contributor amplitude draw")]
    #[clap(value_name = "SIGMA")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub lognormal_sigma: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "hb-cv")]
    #[clap(help = "Coefficient of variation of heterozygote balance")]
    #[clap(value_name = "CV")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub het_balance_cv: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "locus-efficiency")]
    #[clap(help = "Amplification efficiency of the locus")]
    #[clap(value_name = "EFF")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub locus_efficiency: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("ngs")))]
#[command(arg_required_else_help(true))]
pub struct NgsArgs {
    #[clap(required = true)]
    #[clap(short = 'l')]
    #[clap(long = "locus")]
    #[clap(help = "Locus id (unknown ids use the default model)")]
    #[clap(value_name = "LOCUS")]
    pub locus: String,

    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "contributor")]
    #[clap(help = "Contributor as LABEL[:SAMPLE]:PROPORTION:ALLELE,ALLELE (repeatable)")]
    #[clap(value_name = "CONTRIBUTOR")]
    #[arg(value_parser = parse_contributor)]
    pub contributors: Vec<Contributor>,

    #[clap(short = 'd')]
    #[clap(long = "dna")]
    #[clap(help = "Total DNA input in ng")]
    #[clap(value_name = "NG")]
    #[clap(default_value = "0.5")]
    #[arg(value_parser = ensure_dna_input)]
    pub dna_input: f64,

    #[clap(long = "min-reads")]
    #[clap(help = "Minimum reads for a row to be called")]
    #[clap(value_name = "READS")]
    #[clap(default_value = "20")]
    pub min_reads: u64,

    #[clap(long = "min-fraction")]
    #[clap(help = "Minimum fraction of locus coverage for a row to be called")]
    #[clap(value_name = "FRAC")]
    #[clap(default_value = "0.02")]
    #[arg(value_parser = ensure_unit_float)]
    pub min_fraction: f64,

    #[clap(short = 's')]
    #[clap(long = "seed")]
    #[clap(help = "Seed mixed into every draw")]
    #[clap(value_name = "SEED")]
    #[clap(default_value = "0")]
    pub seed: u64,

    #[clap(long = "axis")]
    #[clap(value_name = "SCALE")]
    #[clap(help = "Axis of the bar heights (linear or log)")]
    #[clap(default_value = "linear")]
    pub axis: AxisScale,

    #[clap(long = "loci")]
    #[clap(help = "Locus model table layered over the built-in models")]
    #[clap(value_name = "LOCI")]
    #[arg(value_parser = check_file_exists)]
    pub loci_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(short = 'k')]
    #[clap(long = "degradation")]
    #[clap(help = "Degradation coefficient (0 disables degradation)")]
    #[clap(value_name = "K")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub degradation: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "reads-per-ng")]
    #[clap(help = "Expected reads per ng of template per allele copy")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub reads_per_ng: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "dispersion")]
    #[clap(help = "Negative-binomial dispersion (0 gives Poisson counts)")]
    #[clap(value_name = "DISP")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub dispersion: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "hb-cv")]
    #[clap(help = "Coefficient of variation of heterozygote balance")]
    #[clap(value_name = "CV")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub het_balance_cv: Option<f64>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "locus-efficiency")]
    #[clap(help = "Amplification efficiency of the locus")]
    #[clap(value_name = "EFF")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub locus_efficiency: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("catalog")))]
#[command(arg_required_else_help(true))]
pub struct CatalogArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "catalog")]
    #[clap(help = "Allele catalog (TSV with marker, size, repeat_structure, sequence; may be gzipped)")]
    #[clap(value_name = "CATALOG")]
    #[arg(value_parser = check_file_exists)]
    pub catalog_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'm')]
    #[clap(long = "marker")]
    #[clap(help = "Marker to assemble")]
    #[clap(value_name = "MARKER")]
    pub marker: String,

    #[clap(short = 'r')]
    #[clap(long = "ratio")]
    #[clap(help = "Share of contributor A")]
    #[clap(value_name = "RATIO")]
    #[clap(default_value = "0.5")]
    #[arg(value_parser = ensure_unit_float)]
    pub ratio: f64,

    #[clap(long = "coverage")]
    #[clap(help = "Base coverage split between the contributors")]
    #[clap(value_name = "READS")]
    #[clap(default_value = "1000")]
    #[arg(value_parser = ensure_non_negative_float)]
    pub base_coverage: f64,

    #[clap(short = 's')]
    #[clap(long = "seed")]
    #[clap(help = "Seed for allele selection and coverage jitter")]
    #[clap(value_name = "SEED")]
    #[clap(default_value = "0")]
    pub seed: u64,

    #[clap(long = "curve")]
    #[clap(help = "Print the CE curve after the rows and bars")]
    pub curve: bool,

    #[clap(long = "axis")]
    #[clap(value_name = "SCALE")]
    #[clap(help = "Axis of the bars and CE curve (linear or log)")]
    #[clap(default_value = "linear")]
    pub axis: AxisScale,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("loci")))]
pub struct LociArgs {
    #[clap(long = "loci")]
    #[clap(help = "Locus model table layered over the built-in models")]
    #[clap(value_name = "LOCI")]
    #[arg(value_parser = check_file_exists)]
    pub loci_path: Option<PathBuf>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn parse_contributor(s: &str) -> Result<Contributor> {
    s.parse()
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn ensure_non_negative_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !value.is_finite() || value < 0.0 {
        Err(format!("The value must be a non-negative number, got: {}", value))
    } else {
        Ok(value)
    }
}

/// Upper bound on `--dna`, in ng.
const MAX_DNA_INPUT: f64 = 1000.0;

fn ensure_dna_input(s: &str) -> Result<f64> {
    let value = ensure_non_negative_float(s)?;
    if value > MAX_DNA_INPUT {
        Err(format!(
            "DNA input must be at most {} ng, got: {}",
            MAX_DNA_INPUT, value
        ))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_float_range() {
        assert_eq!(ensure_unit_float("0.25"), Ok(0.25));
        assert!(ensure_unit_float("1.5").is_err());
        assert!(ensure_unit_float("abc").is_err());
    }

    #[test]
    fn test_non_negative_float() {
        assert_eq!(ensure_non_negative_float("0"), Ok(0.0));
        assert!(ensure_non_negative_float("-0.1").is_err());
        assert!(ensure_non_negative_float("inf").is_err());
    }

    #[test]
    fn test_dna_input_bounded() {
        assert_eq!(ensure_dna_input("0.73"), Ok(0.73));
        assert_eq!(ensure_dna_input("1000"), Ok(1000.0));
        assert!(ensure_dna_input("1e16").is_err());
        assert!(ensure_dna_input("-1").is_err());
        assert!(Cli::try_parse_from(["mixsim", "ngs", "-l", "FGA", "-c", "A:1:20", "--dna", "1e16"]).is_err());
    }

    #[test]
    fn test_parse_ce_command() {
        let cli = Cli::try_parse_from([
            "mixsim", "-v", "ce", "-l", "FGA", "-c", "A:S1:0.7:20,22", "-c", "B:0.3:21", "--at",
            "60", "-k", "0.01", "--axis", "log",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 1);
        match cli.command {
            Command::Ce(args) => {
                assert_eq!(args.contributors.len(), 2);
                assert_eq!(args.contributors[1].sample_id, "B");
                assert_eq!(args.analytical_threshold, 60.0);
                assert_eq!(args.stochastic_threshold, 200.0);
                assert_eq!(args.degradation, Some(0.01));
                assert_eq!(args.baseline_mean, None);
                assert_eq!(args.axis, AxisScale::Log);
            }
            _ => panic!("expected ce"),
        }
    }

    #[test]
    fn test_reject_bad_contributor() {
        assert!(Cli::try_parse_from(["mixsim", "ce", "-l", "FGA", "-c", "A:2:20"]).is_err());
        assert!(Cli::try_parse_from([
            "mixsim",
            "ngs",
            "-l",
            "FGA",
            "-c",
            "A:1:20",
            "--min-fraction",
            "2"
        ])
        .is_err());
    }
}
