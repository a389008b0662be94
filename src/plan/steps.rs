//! The fixed provisioning plan, represented as data.
//!
//! Each function returns one ordered block of [`StepSpec`] records; the
//! driver consumes the blocks with a single stop-at-first-failure loop. The
//! order encodes real dependency constraints — the package-manager layer
//! must exist before the toolkit is installed, and several steps mutate the
//! shared `/usr/local` root that later steps assume — so blocks must not be
//! reordered or parallelized.

use crate::engine::StepSpec;
use crate::report::Phase;

/// Miniconda installer artifact downloaded into the working directory.
pub const MINICONDA_INSTALLER: &str = "Miniconda3-py38_23.3.1-0-Linux-x86_64.sh";

/// Download URL for the pinned Miniconda build.
pub const MINICONDA_URL: &str =
    "https://repo.anaconda.com/miniconda/Miniconda3-py38_23.3.1-0-Linux-x86_64.sh";

/// Leftover artifact from the SRA Tools installer; removed by cleanup if present.
pub const SRA_TOOLS_INSTALLER: &str = "install-sra-tools.sh";

/// Prefix the runtime tree is installed under.
pub const INSTALL_PREFIX: &str = "/usr/local";

/// site-packages tree of the installed runtime, used by the
/// plugin-registration block.
pub const SITE_PACKAGES: &str = "/usr/local/lib/python3.8/site-packages";

/// Channels the toolkit is pulled from, in priority order.
const QIIME2_CHANNELS: &[&str] = &[
    "conda-forge",
    "bioconda",
    "qiime2",
    "https://packages.qiime2.org/qiime2/2023.2/tested/",
    "defaults",
];

/// The pinned toolkit, its plugin set, and companion packages.
const QIIME2_PACKAGES: &[&str] = &[
    "qiime2=2023.2",
    "q2cli",
    "q2templates",
    "q2-alignment",
    "q2-composition",
    "q2-cutadapt",
    "q2-dada2",
    "q2-demux",
    "q2-deblur",
    "q2-diversity",
    "q2-diversity-lib",
    "q2-emperor",
    "q2-feature-classifier",
    "q2-feature-table",
    "q2-fragment-insertion",
    "q2-gneiss",
    "q2-longitudinal",
    "q2-metadata",
    "q2-mystery-stew",
    "q2-phylogeny",
    "q2-quality-control",
    "q2-quality-filter",
    "q2-sample-classifier",
    "q2-taxa",
    "q2-vsearch",
    "q2-fondue",
    "q2-types-genomics",
    "ncbi-datasets-pylib",
    "pandas<2",
];

/// Interpreter snippet that registers every `qiime2.plugins` entry point
/// into a plugin manager constructed with automatic loading disabled, then
/// imports one representative plugin.
const REGISTER_PLUGINS_SNIPPET: &str = "\
import qiime2.sdk as sdk
from importlib.metadata import entry_points
pm = sdk.PluginManager(add_plugins=False)
for entry in entry_points()['qiime2.plugins']:
    plugin = entry.load()
    package = entry.value.split(':')[0].split('.')[0]
    pm.add_plugin(plugin, package, entry.name)
from qiime2.plugins import feature_table
";

/// Download and install the Miniconda runtime. Skipped when preflight finds
/// conda already present.
pub fn runtime_steps() -> Vec<StepSpec> {
    vec![
        StepSpec::new(
            Phase::Download,
            "wget",
            &[MINICONDA_URL],
            "saved",
            "Downloading Miniconda...",
            "Failed to download Miniconda.",
            "Miniconda downloaded.",
        ),
        StepSpec::new(
            Phase::Install,
            "bash",
            &[MINICONDA_INSTALLER, "-bfp", INSTALL_PREFIX],
            "installation finished.",
            "Installing Miniconda...",
            "Could not install Miniconda.",
            "Installed Miniconda to `/usr/local`.",
        ),
    ]
}

/// Install the mamba package-manager layer into the base environment.
pub fn package_manager_steps() -> Vec<StepSpec> {
    vec![StepSpec::new(
        Phase::Install,
        "conda",
        &["install", "mamba", "-y", "-n", "base", "-c", "conda-forge"],
        "mamba",
        "Installing mamba...",
        "Could not install mamba.",
        "mamba installed.",
    )]
}

/// Install the toolkit: QIIME 2 core and plugins via mamba, companion tools
/// via pip, and the SRA Tools configuration fix. Skipped as a block when
/// preflight finds QIIME 2 already present.
pub fn toolkit_steps() -> Vec<StepSpec> {
    let mut qiime_args = vec!["install", "-n", "base", "-y"];
    for channel in QIIME2_CHANNELS {
        qiime_args.push("-c");
        qiime_args.push(channel);
    }
    qiime_args.extend_from_slice(QIIME2_PACKAGES);

    vec![
        StepSpec::new(
            Phase::Install,
            "mamba",
            &qiime_args,
            "Executing transaction: ...working... done",
            "Installing QIIME 2. This may take a while...",
            "Could not install QIIME 2.",
            "QIIME 2 installed.",
        ),
        pip_install("redbiom", "Successfully installed", "redbiom"),
        pip_install("q2-clawback", "Successfully installed", "q2-clawback"),
        pip_install(
            "git+https://github.com/bokulich-lab/RESCRIPt.git",
            "Successfully installed",
            "RESCRIPt",
        ),
        pip_install(
            "git+https://github.com/qiime2/provenance-lib.git",
            "Successfully installed",
            "provenance-lib",
        ),
        // Known quirk: vdb-config exits non-zero here yet still writes a
        // working configuration, so only the marker is checked.
        StepSpec::new(
            Phase::Install,
            "vdb-config",
            &["--interactive"],
            "SIGNAL",
            "Fixing the SRA Tools configuration...",
            "Could not configure SRA Tools.",
            "SRA Tools configured.",
        )
        .with_env("CONDA_PREFIX", INSTALL_PREFIX)
        .tolerate_nonzero_exit(),
        pip_install("empress", "Successfully installed empress-", "Empress"),
    ]
}

/// Post-install sanity checks. These always run, even when every install
/// block was skipped, so a broken-but-detected install is still caught.
pub fn verify_steps() -> Vec<StepSpec> {
    vec![
        StepSpec::new(
            Phase::Verify,
            "qiime",
            &["info"],
            "QIIME 2 release:",
            "Checking that the QIIME 2 command line works...",
            "The QIIME 2 command line does not seem to work.",
            "The QIIME 2 command line looks good.",
        ),
        StepSpec::new(
            Phase::Verify,
            "prefetch",
            &["--help"],
            "Usage: prefetch",
            "Checking that the SRA Toolkit works...",
            "The SRA Toolkit does not seem to work.",
            "The SRA Toolkit looks good.",
        ),
    ]
}

/// Import and plugin-registration checks against the installed interpreter.
/// Only run when the runtime version gate matches; both steps are judged on
/// exit code alone (empty marker).
pub fn plugin_registration_steps() -> Vec<StepSpec> {
    vec![
        StepSpec::new(
            Phase::Verify,
            "python3",
            &["-c", "import qiime2"],
            "",
            "Checking that QIIME 2 can be imported...",
            "QIIME 2 can not be imported.",
            "QIIME 2 can be imported.",
        )
        .with_env("PYTHONPATH", SITE_PACKAGES),
        StepSpec::new(
            Phase::Verify,
            "python3",
            &["-c", REGISTER_PLUGINS_SNIPPET],
            "",
            "Registering the QIIME 2 plugins...",
            "Could not register the plugins.",
            "Plugins are working.",
        )
        .with_env("PYTHONPATH", SITE_PACKAGES),
    ]
}

/// Helper for the pip-installed companion tools; they all share the pip
/// success marker shape.
fn pip_install(package: &str, marker: &str, display_name: &str) -> StepSpec {
    StepSpec::new(
        Phase::Install,
        "pip",
        &["install", package],
        marker,
        &format!("Installing {display_name}. This may take a while..."),
        &format!("Could not install {display_name}."),
        &format!("{display_name} installed."),
    )
}
