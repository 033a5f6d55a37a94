use std::collections::HashMap;
use std::convert::TryFrom;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use clap::Parser;
use failure::format_err;
use lazy_static::lazy_static;
use log::{info, warn};
use shader_interface::{StageKind, Session, SessionConfig, EmitConfig};
use shader_interface::spv::{SpirvBinary, SpirvCompiler};

/// Aggregate the interface of a shader program from its SPIR-V stages.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Strip debug information from the emitted binaries.
    #[clap(long)]
    release: bool,
    /// Also aggregate specialization constants.
    #[clap(long)]
    constants: bool,
    /// SPIR-V files named like `sample.frag.spv`, or directories of them.
    #[clap(required = true)]
    paths: Vec<PathBuf>,
}

lazy_static! {
    static ref STAGE_EXTS: HashMap<&'static str, StageKind> = {
        StageKind::all().iter()
            .map(|x| (x.ext(), *x))
            .collect()
    };
}

/// Stage of a file named like `sample.frag.spv`.
fn stage_of(path: &Path) -> Option<StageKind> {
    if path.extension() != Some(OsStr::new("spv")) { return None; }
    let stem = Path::new(path.file_stem()?);
    let ext = stem.extension().and_then(OsStr::to_str)?;
    STAGE_EXTS.get(ext).cloned()
}

fn collect_spirv_binaries(paths: &[PathBuf]) -> Result<Vec<(StageKind, SpirvBinary)>, failure::Error> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in std::fs::read_dir(path)? {
                match entry {
                    Ok(entry) => files.push(entry.path()),
                    Err(err) => warn!("cannot access to filesystem item: {}", err),
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files.sort();

    let mut rv = Vec::new();
    for file in files {
        let stage = match stage_of(&file) {
            Some(x) => x,
            None => {
                warn!("ignored '{}' with no recognizable stage", file.display());
                continue;
            },
        };
        let buf = std::fs::read(&file)?;
        let spv = SpirvBinary::try_from(buf.as_slice())
            .map_err(|e| format_err!("'{}': {}", file.display(), e))?;
        info!("loaded {} stage from '{}'", stage, file.display());
        rv.push((stage, spv));
    }
    Ok(rv)
}

fn main() -> Result<(), failure::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = SessionConfig::new();
    if args.release { cfg = cfg.with_emit(EmitConfig::release()); }
    if args.constants { cfg = cfg.with_constants(); }

    let stages = collect_spirv_binaries(&args.paths)?;
    let stages = stages.iter()
        .map(|(stage, spv)| (*stage, spv))
        .collect::<Vec<_>>();
    let mut sess = Session::new(SpirvCompiler::new(), cfg)?;
    let prog = sess.build(&stages)?;
    println!("{}", prog.iface);
    Ok(())
}
