use std::{convert::TryFrom, env, fmt, path::PathBuf};

const VERSION: &str = "--الإصدار";
const HELP: &str = "--ساعد";
const DISASSEMBLE: &str = "--وضح";
const COMPILE: &str = "--اجمع";
const RUN_BYTECODE: &str = "--نفذ";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flag {
    Version,
    Help,
    Disassemble,
    Compile,
    RunBytecode,
}

impl TryFrom<&str> for Flag {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            VERSION => Ok(Self::Version),
            HELP => Ok(Self::Help),
            DISASSEMBLE => Ok(Self::Disassemble),
            COMPILE => Ok(Self::Compile),
            RUN_BYTECODE => Ok(Self::RunBytecode),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArgsError {
    UnknownFlag(String),
    MissingPath(&'static str),
    UnexpectedArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownFlag(flag) => write!(f, "لا يوجد إعداد يسمى {flag}"),
            Self::MissingPath(what) => write!(f, "توقعت مسار {what}"),
            Self::UnexpectedArg(arg) => write!(f, "مدخل غير متوقع: {arg}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    Version,
    Help,
    Repl,
    File {
        path: PathBuf,
        disassemble: bool,
    },
    Compile {
        path: PathBuf,
        output: PathBuf,
    },
    RunBytecode {
        path: PathBuf,
    },
}

impl TryFrom<env::Args> for Mode {
    type Error = ArgsError;

    fn try_from(mut args: env::Args) -> Result<Self, Self::Error> {
        args.next();

        let mut flags = vec![];
        let mut paths: Vec<PathBuf> = vec![];
        let mut output = None;

        while let Some(arg) = args.next() {
            if arg.starts_with("--") {
                let flag = Flag::try_from(arg.as_str())
                    .map_err(|_| ArgsError::UnknownFlag(arg.clone()))?;
                if flag == Flag::Compile {
                    let out = args.next().ok_or(ArgsError::MissingPath("الملف الناتج"))?;
                    output = Some(PathBuf::from(out));
                }
                flags.push(flag);
            } else {
                paths.push(PathBuf::from(arg));
            }
        }

        if flags.contains(&Flag::Version) {
            return Ok(Self::Version);
        }
        if flags.contains(&Flag::Help) {
            return Ok(Self::Help);
        }

        if paths.len() > 1 {
            return Err(ArgsError::UnexpectedArg(
                paths[1].display().to_string(),
            ));
        }

        if flags.contains(&Flag::RunBytecode) {
            let path = paths.pop().ok_or(ArgsError::MissingPath("ملف البايتكود"))?;
            return Ok(Self::RunBytecode { path });
        }

        if let Some(output) = output {
            let path = paths.pop().ok_or(ArgsError::MissingPath("الملف المصدر"))?;
            return Ok(Self::Compile { path, output });
        }

        match paths.pop() {
            Some(path) => Ok(Self::File {
                path,
                disassemble: flags.contains(&Flag::Disassemble),
            }),
            None => Ok(Self::Repl),
        }
    }
}
