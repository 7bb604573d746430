use std::{
    env, fs,
    io::Result,
    path::{Path, PathBuf},
};

use clap_complete::{Shell, generate_to};

include!("src/args.rs");

fn create_dir(dir: &Path) -> Result<()> {
    let res = fs::create_dir_all(dir);
    match &res {
        Ok(()) => {}
        Err(err) => {
            eprintln!(
                "Failed to create a directory at location {dir:?}, encountered error {err:?}.  Aborting...",
            );
        }
    }

    res
}

fn generate_completions() -> Result<()> {
    const COMPLETION_DIR: &str = "./target/tmp/memstat/completion/";
    const MANPAGE_DIR: &str = "./target/tmp/memstat/manpage/";

    match env::var_os("MEMSTAT_GENERATE") {
        Some(var) if !var.is_empty() => {
            let completion_out_dir = PathBuf::from(COMPLETION_DIR);
            let manpage_out_dir = PathBuf::from(MANPAGE_DIR);

            create_dir(&completion_out_dir)?;
            create_dir(&manpage_out_dir)?;

            // Generate completions
            let mut cmd = build_cmd();
            generate_to(Shell::Bash, &mut cmd, "memstat", &completion_out_dir)?;
            generate_to(Shell::Zsh, &mut cmd, "memstat", &completion_out_dir)?;
            generate_to(Shell::Fish, &mut cmd, "memstat", &completion_out_dir)?;
            generate_to(Shell::PowerShell, &mut cmd, "memstat", &completion_out_dir)?;
            generate_to(Shell::Elvish, &mut cmd, "memstat", &completion_out_dir)?;

            // Generate manpage
            let cmd = cmd.name("memstat");
            let man = clap_mangen::Man::new(cmd);
            let mut buffer: Vec<u8> = Default::default();
            man.render(&mut buffer)?;
            fs::write(manpage_out_dir.join("memstat.1"), buffer)?;
        }
        _ => {}
    }

    Ok(())
}

fn main() -> Result<()> {
    generate_completions()?;

    println!("cargo:rerun-if-env-changed=MEMSTAT_GENERATE");
    println!("cargo:rerun-if-changed=src/args.rs");

    Ok(())
}
