use clap::{ArgAction, Args, ValueEnum};
use ferrisql_core::domain::{
    common::{CompilerConfig, DEFAULT_MAX_RELATION_DEPTH, entities::app_errors::CoreError},
    compiler::Dialect,
    query::LanguageCode,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Backtick-quoted identifiers
    #[default]
    Mysql,
    /// Double-quoted identifiers
    Ansi,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Ansi => Dialect::Ansi,
        }
    }
}

/// Compiler settings, flattened into the server's arguments.
#[derive(Debug, Clone, Args)]
pub struct CompilerArgs {
    #[arg(long = "sql-dialect", env = "SQL_DIALECT", value_enum, default_value_t = DialectArg::Mysql)]
    pub dialect: DialectArg,

    #[arg(long, env = "SQL_STRICT_SORT", default_value_t = true, action = ArgAction::Set)]
    pub strict_sort: bool,

    #[arg(long, env = "SQL_MAX_RELATION_DEPTH", default_value_t = DEFAULT_MAX_RELATION_DEPTH)]
    pub max_relation_depth: usize,

    #[arg(long, env = "DEFAULT_LANGUAGE")]
    pub default_language: Option<String>,
}

impl TryFrom<CompilerArgs> for CompilerConfig {
    type Error = CoreError;

    fn try_from(args: CompilerArgs) -> Result<Self, Self::Error> {
        let default_language = args
            .default_language
            .as_deref()
            .map(LanguageCode::parse)
            .transpose()?;

        Ok(CompilerConfig {
            dialect: args.dialect.into(),
            strict_sort: args.strict_sort,
            max_relation_depth: args.max_relation_depth,
            default_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        compiler: CompilerArgs,
    }

    fn parse(args: &[&str]) -> Result<CompilerConfig, CoreError> {
        let cli = Cli::try_parse_from(std::iter::once("ferrisql").chain(args.iter().copied())).unwrap();
        CompilerConfig::try_from(cli.compiler)
    }

    #[test]
    fn test_explicit_flags() {
        let config = parse(&[
            "--sql-dialect",
            "ansi",
            "--strict-sort",
            "false",
            "--max-relation-depth",
            "3",
            "--default-language",
            "de",
        ])
        .unwrap();

        assert_eq!(config.dialect, Dialect::Ansi);
        assert!(!config.strict_sort);
        assert_eq!(config.max_relation_depth, 3);
        assert_eq!(config.default_language.unwrap().as_str(), "de");
    }

    #[test]
    fn test_invalid_language() {
        let err = parse(&["--default-language", "de;"]).unwrap_err();
        assert_eq!(err, CoreError::InvalidLanguage("de;".to_string()));
    }
}
