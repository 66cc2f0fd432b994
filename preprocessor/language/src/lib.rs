//vocabulary shared by the preprocessor crates

pub mod symbol {
    pub const EQ: &str = "=";
    pub const NEQ: &str = "!=";
    pub const LT: &str = "<";
    pub const LEQ: &str = "<=";
    pub const GT: &str = ">";
    pub const GEQ: &str = ">=";

    pub const RELATIONAL_SYMBOLS: [&str; 6] = [EQ, NEQ, LT, LEQ, GT, GEQ];

    pub const ADD: &str = "+";
    pub const SUB: &str = "-";
    pub const MUL: &str = "*";
    pub const DIV: &str = "/";

    pub const ARITHMETIC_SYMBOLS: [&str; 4] = [ADD, SUB, MUL, DIV];

    pub const PARAMETER_PREFIX: &str = "?";
    pub const NEGATION_PREFIX: &str = "not ";
}

pub mod types {
    pub const TYPE_INT: &str = "int";
    pub const TYPE_NUMBER: &str = "number";
    /// Codomain of every predicate.
    pub const TYPE_BOOL: &str = "_bool_";

    pub const INT_TYPES: [&str; 2] = [TYPE_INT, TYPE_NUMBER];
}

pub mod code {
    pub const BINDING: &str = "_binding";
    pub const RELEVANT: &str = "_relevant";
    pub const AFFECTED: &str = "_affected";
    pub const STATIC: &str = "_static";
    pub const STATE: &str = "_state";
    pub const ATOM: &str = "Atom";
}

pub mod output {
    pub const ACTIONS_FILE: &str = "actions.json";
    pub const PROCEDURES_FILE: &str = "procedures.cxx";
    pub const LOGS_DIR: &str = "p3r_logs";
}
