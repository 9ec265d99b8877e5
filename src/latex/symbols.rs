//! Command tables: symbols, function names, big operators and spacing

/// Spacing class of an atom, used to put space around operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomClass {
    /// Ordinary symbols: letters, digits, greek
    Ord,
    /// Binary operators: `+`, `-`, `\times`
    Bin,
    /// Relations: `=`, `<`, `\leq`, arrows
    Rel,
    /// Punctuation: `,` `;`
    Punct,
    Open,
    Close,
}

/// Resolve a symbol command (without backslash) to its character and class.
pub fn symbol(name: &str) -> Option<(char, AtomClass)> {
    use AtomClass::*;
    let entry = match name {
        // lowercase greek
        "alpha" => ('α', Ord),
        "beta" => ('β', Ord),
        "gamma" => ('γ', Ord),
        "delta" => ('δ', Ord),
        "epsilon" | "varepsilon" => ('ε', Ord),
        "zeta" => ('ζ', Ord),
        "eta" => ('η', Ord),
        "theta" | "vartheta" => ('θ', Ord),
        "iota" => ('ι', Ord),
        "kappa" => ('κ', Ord),
        "lambda" => ('λ', Ord),
        "mu" => ('μ', Ord),
        "nu" => ('ν', Ord),
        "xi" => ('ξ', Ord),
        "omicron" => ('ο', Ord),
        "pi" | "varpi" => ('π', Ord),
        "rho" | "varrho" => ('ρ', Ord),
        "sigma" => ('σ', Ord),
        "varsigma" => ('ς', Ord),
        "tau" => ('τ', Ord),
        "upsilon" => ('υ', Ord),
        "phi" | "varphi" => ('φ', Ord),
        "chi" => ('χ', Ord),
        "psi" => ('ψ', Ord),
        "omega" => ('ω', Ord),
        // uppercase greek
        "Gamma" => ('Γ', Ord),
        "Delta" => ('Δ', Ord),
        "Theta" => ('Θ', Ord),
        "Lambda" => ('Λ', Ord),
        "Xi" => ('Ξ', Ord),
        "Pi" => ('Π', Ord),
        "Sigma" => ('Σ', Ord),
        "Upsilon" => ('Υ', Ord),
        "Phi" => ('Φ', Ord),
        "Psi" => ('Ψ', Ord),
        "Omega" => ('Ω', Ord),
        // binary operators
        "pm" => ('±', Bin),
        "mp" => ('∓', Bin),
        "times" => ('×', Bin),
        "div" => ('÷', Bin),
        "cdot" => ('·', Bin),
        "ast" => ('*', Bin),
        "circ" => ('∘', Bin),
        "bullet" => ('•', Bin),
        "oplus" => ('⊕', Bin),
        "otimes" => ('⊗', Bin),
        "cup" => ('∪', Bin),
        "cap" => ('∩', Bin),
        "wedge" | "land" => ('∧', Bin),
        "vee" | "lor" => ('∨', Bin),
        "setminus" => ('\\', Bin),
        // relations
        "leq" | "le" => ('≤', Rel),
        "geq" | "ge" => ('≥', Rel),
        "neq" | "ne" => ('≠', Rel),
        "approx" => ('≈', Rel),
        "equiv" => ('≡', Rel),
        "sim" => ('∼', Rel),
        "simeq" | "cong" => ('≃', Rel),
        "propto" => ('∝', Rel),
        "in" => ('∈', Rel),
        "notin" => ('∉', Rel),
        "subset" => ('⊂', Rel),
        "subseteq" => ('⊆', Rel),
        "supset" => ('⊃', Rel),
        "supseteq" => ('⊇', Rel),
        "ll" => ('≪', Rel),
        "gg" => ('≫', Rel),
        "perp" => ('⊥', Rel),
        "parallel" => ('∥', Rel),
        "mid" => ('|', Rel),
        // arrows
        "to" | "rightarrow" => ('→', Rel),
        "leftarrow" | "gets" => ('←', Rel),
        "Rightarrow" | "implies" => ('⇒', Rel),
        "Leftarrow" => ('⇐', Rel),
        "Leftrightarrow" | "iff" => ('⇔', Rel),
        "leftrightarrow" => ('↔', Rel),
        "mapsto" => ('↦', Rel),
        "uparrow" => ('↑', Rel),
        "downarrow" => ('↓', Rel),
        // miscellaneous
        "infty" => ('∞', Ord),
        "partial" => ('∂', Ord),
        "nabla" => ('∇', Ord),
        "forall" => ('∀', Ord),
        "exists" => ('∃', Ord),
        "emptyset" | "varnothing" => ('∅', Ord),
        "angle" => ('∠', Ord),
        "triangle" => ('△', Ord),
        "neg" | "lnot" => ('¬', Ord),
        "ldots" | "dots" => ('…', Ord),
        "cdots" => ('⋯', Ord),
        "prime" => ('′', Ord),
        "degree" => ('°', Ord),
        "hbar" => ('ħ', Ord),
        "ell" => ('ℓ', Ord),
        // escaped characters
        "{" => ('{', Open),
        "}" => ('}', Close),
        "$" => ('$', Ord),
        "%" => ('%', Ord),
        "&" => ('&', Ord),
        "#" => ('#', Ord),
        "_" => ('_', Ord),
        "|" => ('∥', Ord),
        "langle" => ('⟨', Open),
        "rangle" => ('⟩', Close),
        "lvert" => ('|', Open),
        "rvert" => ('|', Close),
        _ => return None,
    };
    Some(entry)
}

/// Class of a plain (non-command) character.
pub fn char_class(c: char) -> AtomClass {
    match c {
        '+' | '-' | '*' | '/' | '±' | '×' | '÷' | '·' => AtomClass::Bin,
        '=' | '<' | '>' | ':' => AtomClass::Rel,
        ',' | ';' => AtomClass::Punct,
        '(' | '[' => AtomClass::Open,
        ')' | ']' => AtomClass::Close,
        _ => AtomClass::Ord,
    }
}

/// Upright function names such as `\sin`. Returns the displayed text and
/// whether sub/superscripts are set as limits above and below.
pub fn function_name(name: &str) -> Option<(&'static str, bool)> {
    let entry = match name {
        "sin" => ("sin", false),
        "cos" => ("cos", false),
        "tan" => ("tan", false),
        "cot" => ("cot", false),
        "sec" => ("sec", false),
        "csc" => ("csc", false),
        "sinh" => ("sinh", false),
        "cosh" => ("cosh", false),
        "tanh" => ("tanh", false),
        "arcsin" => ("arcsin", false),
        "arccos" => ("arccos", false),
        "arctan" => ("arctan", false),
        "log" => ("log", false),
        "ln" => ("ln", false),
        "lg" => ("lg", false),
        "exp" => ("exp", false),
        "arg" => ("arg", false),
        "deg" => ("deg", false),
        "dim" => ("dim", false),
        "ker" => ("ker", false),
        "hom" => ("hom", false),
        "gcd" => ("gcd", true),
        "det" => ("det", true),
        "lim" => ("lim", true),
        "limsup" => ("lim sup", true),
        "liminf" => ("lim inf", true),
        "max" => ("max", true),
        "min" => ("min", true),
        "sup" => ("sup", true),
        "inf" => ("inf", true),
        "Pr" => ("Pr", true),
        "mod" | "bmod" => ("mod", false),
        _ => return None,
    };
    Some(entry)
}

/// Large operators. Returns the glyph and whether scripts become limits.
pub fn big_operator(name: &str) -> Option<(char, bool)> {
    let entry = match name {
        "sum" => ('Σ', true),
        "prod" => ('Π', true),
        "coprod" => ('∐', true),
        "bigcup" => ('⋃', true),
        "bigcap" => ('⋂', true),
        "int" => ('∫', false),
        "iint" => ('∬', false),
        "oint" => ('∮', false),
        _ => return None,
    };
    Some(entry)
}

/// Explicit spacing commands, in em.
pub fn spacing(name: &str) -> Option<f32> {
    let em = match name {
        "," => 3.0 / 18.0,
        ":" | ">" => 4.0 / 18.0,
        ";" => 5.0 / 18.0,
        "!" => -3.0 / 18.0,
        " " => 0.33,
        "quad" => 1.0,
        "qquad" => 2.0,
        _ => return None,
    };
    Some(em)
}

/// Plain delimiter characters accepted after `\left` / `\right`. `.` is the
/// null delimiter.
pub fn delimiter_char(c: char) -> Option<char> {
    matches!(c, '(' | ')' | '[' | ']' | '|' | '/' | '.').then_some(c)
}

/// Delimiter commands accepted after `\left` / `\right`.
pub fn delimiter_command(name: &str) -> Option<char> {
    let c = match name {
        "{" | "lbrace" => '{',
        "}" | "rbrace" => '}',
        "langle" => '⟨',
        "rangle" => '⟩',
        "|" | "Vert" => '∥',
        "vert" | "lvert" | "rvert" => '|',
        "lfloor" => '⌊',
        "rfloor" => '⌋',
        "lceil" => '⌈',
        "rceil" => '⌉',
        _ => return None,
    };
    Some(c)
}

/// Commands that are recognized but cannot be rendered.
pub fn is_unsupported(name: &str) -> bool {
    matches!(
        name,
        "begin"
            | "end"
            | "\\"
            | "usepackage"
            | "documentclass"
            | "chemfig"
            | "newcommand"
            | "renewcommand"
            | "def"
            | "label"
            | "tag"
            | "color"
            | "textcolor"
            | "includegraphics"
    )
}

/// Every character produced by the tables above, for glyph coverage checks.
pub fn all_symbol_chars() -> Vec<char> {
    let names = [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
        "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "varsigma", "tau", "upsilon",
        "phi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma",
        "Upsilon", "Phi", "Psi", "Omega", "pm", "mp", "times", "div", "cdot", "ast", "circ",
        "bullet", "oplus", "otimes", "cup", "cap", "wedge", "vee", "setminus", "leq", "geq", "neq",
        "approx", "equiv", "sim", "simeq", "propto", "in", "notin", "subset", "subseteq", "supset",
        "supseteq", "ll", "gg", "perp", "parallel", "mid", "to", "leftarrow", "Rightarrow",
        "Leftarrow", "Leftrightarrow", "leftrightarrow", "mapsto", "uparrow", "downarrow", "infty",
        "partial", "nabla", "forall", "exists", "emptyset", "angle", "triangle", "neg", "ldots",
        "cdots", "prime", "degree", "hbar", "ell", "{", "}", "$", "%", "&", "#", "_", "|",
        "langle", "rangle", "lvert", "rvert",
    ];
    let mut chars: Vec<char> = names.iter().filter_map(|n| symbol(n)).map(|(c, _)| c).collect();
    for op in ["sum", "prod", "coprod", "bigcup", "bigcap", "int", "iint", "oint"] {
        chars.extend(big_operator(op).map(|(c, _)| c));
    }
    chars.extend("()[]|/".chars().filter_map(delimiter_char));
    for d in ["{", "}", "langle", "rangle", "Vert", "lfloor", "rfloor", "lceil", "rceil"] {
        chars.extend(delimiter_command(d));
    }
    chars
}
