use std::{fs, path::PathBuf, process};

use clap::Parser as ClapParser;

use kindle::bytecode::disasm::print_bc;
use kindle::frontend::token_dumper::TokenDumper;
use kindle::pipeline::Pipeline;
use kindle::runtime::{VmBc, VmBcConfig};

/// Run a kindle program.
#[derive(ClapParser, Debug)]
#[command(name = "kindle", version, about)]
struct Cli {
    /// Source file to run
    file: PathBuf,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colours in the token dump
    #[arg(long)]
    no_color: bool,

    /// Print the parsed AST and exit
    #[arg(long)]
    ast: bool,

    /// Print the bytecode disassembly and exit
    #[arg(long)]
    bc: bool,

    /// Write the compiled bytecode image to PATH and exit
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,

    /// Abort after N executed instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<usize>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", cli.file.display(), e);
            process::exit(1);
        }
    };

    let pipeline = Pipeline::new(&source);

    if cli.tokens {
        let mut dumper = TokenDumper::new();
        if cli.no_color {
            dumper = dumper.no_color();
        }
        dumper.dump(&pipeline.tokens());
        return;
    }

    let program = match pipeline.parse() {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    if cli.ast {
        println!("{:#?}", program);
        return;
    }

    let bc = match pipeline.compile(&program) {
        Ok(bc) => bc,
        Err(e) => fail(e),
    };

    if cli.bc {
        print_bc(&bc);
        return;
    }

    if let Some(path) = &cli.emit {
        let image = match bc.to_bytes() {
            Ok(image) => image,
            Err(e) => fail(format!("Failed to encode bytecode: {}", e)),
        };
        if let Err(e) = fs::write(path, image) {
            fail(format!("Failed to write '{}': {}", path.display(), e));
        }
        return;
    }

    let config = VmBcConfig {
        max_steps: cli.max_steps,
        ..VmBcConfig::default()
    };
    let mut vm = VmBc::with_config(config);
    if let Err(e) = vm.run(&bc) {
        fail(e);
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}
