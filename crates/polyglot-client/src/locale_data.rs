//! Built-in locale conventions used by the formatting processors.
//!
//! Data is keyed by language subtag. English, French, German and Spanish are
//! complete; Italian, Dutch and Portuguese only carry number symbols and
//! use English words otherwise. Unknown languages use English.

/// Number symbols and affix placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    /// Decimal separator.
    pub decimal: &'static str,
    /// Grouping separator.
    pub group: &'static str,
    /// Integer digits needed beyond 3 before grouping starts (1 groups 1000).
    pub min_grouping: usize,
    /// Text between a number and `%`.
    pub percent_space: &'static str,
    /// Whether the currency symbol follows the amount.
    pub currency_after: bool,
    /// Text between an amount and a following currency symbol.
    pub currency_space: &'static str,
    /// Compact suffixes for thousands, millions, billions and trillions.
    pub compact: [&'static str; 4],
}

/// Words of relative time formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeWords {
    /// Future pattern, `{0}` being the quantity and unit.
    pub future: &'static str,
    /// Past pattern.
    pub past: &'static str,
    /// Singular and plural long names of second, minute, hour, day, week, month, year.
    pub long: [(&'static str, &'static str); 7],
    /// Short names, same order.
    pub short: [(&'static str, &'static str); 7],
    /// Yesterday, today and tomorrow.
    pub days: [&'static str; 3],
}

/// Separators of one list kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWords {
    /// Between the items of a two-item list.
    pub pair: &'static str,
    /// Between items that are not the last two.
    pub middle: &'static str,
    /// Before the last item of a longer list.
    pub end: &'static str,
}

/// Unit names for duration parts, years to nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitWords {
    /// Singular and plural long names.
    pub long: [(&'static str, &'static str); 10],
    /// Short names, singular and plural.
    pub short: [(&'static str, &'static str); 10],
    /// Narrow suffixes, glued to the number.
    pub narrow: [&'static str; 10],
}

/// Everything the formatters know about one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleData {
    /// Language subtag.
    pub language: &'static str,
    /// Index of the language in the display name tables.
    pub names_column: usize,
    /// Number symbols.
    pub numbers: NumberSymbols,
    /// Month names.
    pub months: [&'static str; 12],
    /// Abbreviated month names.
    pub months_short: [&'static str; 12],
    /// Weekday names, Monday first.
    pub weekdays: [&'static str; 7],
    /// Before and after noon markers.
    pub day_periods: [&'static str; 2],
    /// Short, medium, long and full date patterns.
    pub date_patterns: [&'static str; 4],
    /// Short, medium, long and full time patterns.
    pub time_patterns: [&'static str; 4],
    /// Text joining a date and a time.
    pub date_time_joiner: &'static str,
    /// Pattern used when neither a date nor a time style is given.
    pub default_pattern: &'static str,
    /// Relative time words.
    pub relative: RelativeWords,
    /// Conjunction list separators.
    pub and: ListWords,
    /// Disjunction list separators.
    pub or: ListWords,
    /// Unit list separators.
    pub units_list: ListWords,
    /// Duration unit names.
    pub units: UnitWords,
}

const EN: LocaleData = LocaleData {
    language: "en",
    names_column: 0,
    numbers: NumberSymbols {
        decimal: ".",
        group: ",",
        min_grouping: 1,
        percent_space: "",
        currency_after: false,
        currency_space: "",
        compact: ["K", "M", "B", "T"],
    },
    months: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],
    months_short: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    weekdays: [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ],
    day_periods: ["AM", "PM"],
    date_patterns: ["M/d/yy", "MMM d, y", "MMMM d, y", "EEEE, MMMM d, y"],
    time_patterns: ["h:mm a", "h:mm:ss a", "h:mm:ss a z", "h:mm:ss a z"],
    date_time_joiner: ", ",
    default_pattern: "M/d/y, h:mm:ss a",
    relative: RelativeWords {
        future: "in {0}",
        past: "{0} ago",
        long: [
            ("second", "seconds"),
            ("minute", "minutes"),
            ("hour", "hours"),
            ("day", "days"),
            ("week", "weeks"),
            ("month", "months"),
            ("year", "years"),
        ],
        short: [
            ("sec.", "sec."),
            ("min.", "min."),
            ("hr.", "hr."),
            ("day", "days"),
            ("wk.", "wk."),
            ("mo.", "mo."),
            ("yr.", "yr."),
        ],
        days: ["yesterday", "today", "tomorrow"],
    },
    and: ListWords {
        pair: " and ",
        middle: ", ",
        end: ", and ",
    },
    or: ListWords {
        pair: " or ",
        middle: ", ",
        end: ", or ",
    },
    units_list: ListWords {
        pair: ", ",
        middle: ", ",
        end: ", ",
    },
    units: UnitWords {
        long: [
            ("year", "years"),
            ("month", "months"),
            ("week", "weeks"),
            ("day", "days"),
            ("hour", "hours"),
            ("minute", "minutes"),
            ("second", "seconds"),
            ("millisecond", "milliseconds"),
            ("microsecond", "microseconds"),
            ("nanosecond", "nanoseconds"),
        ],
        short: [
            ("yr", "yrs"),
            ("mth", "mths"),
            ("wk", "wks"),
            ("day", "days"),
            ("hr", "hr"),
            ("min", "min"),
            ("sec", "sec"),
            ("ms", "ms"),
            ("μs", "μs"),
            ("ns", "ns"),
        ],
        narrow: ["y", "m", "w", "d", "h", "m", "s", "ms", "μs", "ns"],
    },
};

const FR: LocaleData = LocaleData {
    language: "fr",
    names_column: 1,
    numbers: NumberSymbols {
        decimal: ",",
        group: "\u{202f}",
        min_grouping: 1,
        percent_space: "\u{a0}",
        currency_after: true,
        currency_space: "\u{a0}",
        compact: ["\u{a0}k", "\u{a0}M", "\u{a0}Md", "\u{a0}Bn"],
    },
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    months_short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    weekdays: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    day_periods: ["AM", "PM"],
    date_patterns: ["dd/MM/y", "d MMM y", "d MMMM y", "EEEE d MMMM y"],
    time_patterns: ["HH:mm", "HH:mm:ss", "HH:mm:ss z", "HH:mm:ss z"],
    date_time_joiner: " ",
    default_pattern: "dd/MM/y HH:mm:ss",
    relative: RelativeWords {
        future: "dans {0}",
        past: "il y a {0}",
        long: [
            ("seconde", "secondes"),
            ("minute", "minutes"),
            ("heure", "heures"),
            ("jour", "jours"),
            ("semaine", "semaines"),
            ("mois", "mois"),
            ("an", "ans"),
        ],
        short: [
            ("s", "s"),
            ("min", "min"),
            ("h", "h"),
            ("j", "j"),
            ("sem.", "sem."),
            ("m.", "m."),
            ("a", "a"),
        ],
        days: ["hier", "aujourd’hui", "demain"],
    },
    and: ListWords {
        pair: " et ",
        middle: ", ",
        end: " et ",
    },
    or: ListWords {
        pair: " ou ",
        middle: ", ",
        end: " ou ",
    },
    units_list: ListWords {
        pair: " et ",
        middle: ", ",
        end: " et ",
    },
    units: UnitWords {
        long: [
            ("an", "ans"),
            ("mois", "mois"),
            ("semaine", "semaines"),
            ("jour", "jours"),
            ("heure", "heures"),
            ("minute", "minutes"),
            ("seconde", "secondes"),
            ("milliseconde", "millisecondes"),
            ("microseconde", "microsecondes"),
            ("nanoseconde", "nanosecondes"),
        ],
        short: [
            ("an", "ans"),
            ("m.", "m."),
            ("sem.", "sem."),
            ("j", "j"),
            ("h", "h"),
            ("min", "min"),
            ("s", "s"),
            ("ms", "ms"),
            ("μs", "μs"),
            ("ns", "ns"),
        ],
        narrow: ["a", "m.", "sem.", "j", "h", "min", "s", "ms", "μs", "ns"],
    },
};

const DE: LocaleData = LocaleData {
    language: "de",
    names_column: 2,
    numbers: NumberSymbols {
        decimal: ",",
        group: ".",
        min_grouping: 1,
        percent_space: "\u{a0}",
        currency_after: true,
        currency_space: "\u{a0}",
        compact: ["\u{a0}Tsd.", "\u{a0}Mio.", "\u{a0}Mrd.", "\u{a0}Bio."],
    },
    months: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    months_short: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    weekdays: [
        "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag",
    ],
    day_periods: ["AM", "PM"],
    date_patterns: ["dd.MM.yy", "dd.MM.y", "d. MMMM y", "EEEE, d. MMMM y"],
    time_patterns: ["HH:mm", "HH:mm:ss", "HH:mm:ss z", "HH:mm:ss z"],
    date_time_joiner: ", ",
    default_pattern: "d.M.y, HH:mm:ss",
    relative: RelativeWords {
        future: "in {0}",
        past: "vor {0}",
        long: [
            ("Sekunde", "Sekunden"),
            ("Minute", "Minuten"),
            ("Stunde", "Stunden"),
            ("Tag", "Tagen"),
            ("Woche", "Wochen"),
            ("Monat", "Monaten"),
            ("Jahr", "Jahren"),
        ],
        short: [
            ("Sek.", "Sek."),
            ("Min.", "Min."),
            ("Std.", "Std."),
            ("Tag", "Tagen"),
            ("Woche", "Wochen"),
            ("Monat", "Monaten"),
            ("Jahr", "Jahren"),
        ],
        days: ["gestern", "heute", "morgen"],
    },
    and: ListWords {
        pair: " und ",
        middle: ", ",
        end: " und ",
    },
    or: ListWords {
        pair: " oder ",
        middle: ", ",
        end: " oder ",
    },
    units_list: ListWords {
        pair: ", ",
        middle: ", ",
        end: " und ",
    },
    units: UnitWords {
        long: [
            ("Jahr", "Jahre"),
            ("Monat", "Monate"),
            ("Woche", "Wochen"),
            ("Tag", "Tage"),
            ("Stunde", "Stunden"),
            ("Minute", "Minuten"),
            ("Sekunde", "Sekunden"),
            ("Millisekunde", "Millisekunden"),
            ("Mikrosekunde", "Mikrosekunden"),
            ("Nanosekunde", "Nanosekunden"),
        ],
        short: [
            ("J.", "J."),
            ("Mon.", "Mon."),
            ("Wo.", "Wo."),
            ("Tg.", "Tg."),
            ("Std.", "Std."),
            ("Min.", "Min."),
            ("Sek.", "Sek."),
            ("ms", "ms"),
            ("μs", "μs"),
            ("ns", "ns"),
        ],
        narrow: ["J", "M", "W", "T", "Std.", "Min.", "Sek.", "ms", "μs", "ns"],
    },
};

const ES: LocaleData = LocaleData {
    language: "es",
    names_column: 3,
    numbers: NumberSymbols {
        decimal: ",",
        group: ".",
        min_grouping: 2,
        percent_space: "\u{a0}",
        currency_after: true,
        currency_space: "\u{a0}",
        compact: ["\u{a0}mil", "\u{a0}M", "\u{a0}mil\u{a0}M", "\u{a0}B"],
    },
    months: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    months_short: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    weekdays: [
        "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
    ],
    day_periods: ["a.\u{a0}m.", "p.\u{a0}m."],
    date_patterns: ["d/M/yy", "d MMM y", "d 'de' MMMM 'de' y", "EEEE, d 'de' MMMM 'de' y"],
    time_patterns: ["H:mm", "H:mm:ss", "H:mm:ss z", "H:mm:ss z"],
    date_time_joiner: ", ",
    default_pattern: "d/M/y, H:mm:ss",
    relative: RelativeWords {
        future: "dentro de {0}",
        past: "hace {0}",
        long: [
            ("segundo", "segundos"),
            ("minuto", "minutos"),
            ("hora", "horas"),
            ("día", "días"),
            ("semana", "semanas"),
            ("mes", "meses"),
            ("año", "años"),
        ],
        short: [
            ("s", "s"),
            ("min", "min"),
            ("h", "h"),
            ("d", "d"),
            ("sem.", "sem."),
            ("m.", "m."),
            ("a", "a"),
        ],
        days: ["ayer", "hoy", "mañana"],
    },
    and: ListWords {
        pair: " y ",
        middle: ", ",
        end: " y ",
    },
    or: ListWords {
        pair: " o ",
        middle: ", ",
        end: " o ",
    },
    units_list: ListWords {
        pair: " y ",
        middle: ", ",
        end: " y ",
    },
    units: UnitWords {
        long: [
            ("año", "años"),
            ("mes", "meses"),
            ("semana", "semanas"),
            ("día", "días"),
            ("hora", "horas"),
            ("minuto", "minutos"),
            ("segundo", "segundos"),
            ("milisegundo", "milisegundos"),
            ("microsegundo", "microsegundos"),
            ("nanosegundo", "nanosegundos"),
        ],
        short: [
            ("a", "a"),
            ("m.", "m."),
            ("sem.", "sem."),
            ("d", "d"),
            ("h", "h"),
            ("min", "min"),
            ("s", "s"),
            ("ms", "ms"),
            ("μs", "μs"),
            ("ns", "ns"),
        ],
        narrow: ["a", "m", "sem", "d", "h", "min", "s", "ms", "μs", "ns"],
    },
};

const IT: LocaleData = LocaleData {
    language: "it",
    numbers: NumberSymbols {
        decimal: ",",
        group: ".",
        min_grouping: 1,
        percent_space: "",
        currency_after: true,
        currency_space: "\u{a0}",
        compact: ["", "\u{a0}Mln", "\u{a0}Mrd", "\u{a0}Bln"],
    },
    ..EN
};

const NL: LocaleData = LocaleData {
    language: "nl",
    numbers: NumberSymbols {
        decimal: ",",
        group: ".",
        min_grouping: 1,
        percent_space: "",
        currency_after: false,
        currency_space: "\u{a0}",
        compact: ["K", "\u{a0}mln.", "\u{a0}mld.", "\u{a0}bln."],
    },
    ..EN
};

const PT: LocaleData = LocaleData {
    language: "pt",
    numbers: NumberSymbols {
        decimal: ",",
        group: ".",
        min_grouping: 1,
        percent_space: "",
        currency_after: false,
        currency_space: "\u{a0}",
        compact: ["\u{a0}mil", "\u{a0}mi", "\u{a0}bi", "\u{a0}tri"],
    },
    ..EN
};

const ALL: [&LocaleData; 7] = [&EN, &FR, &DE, &ES, &IT, &NL, &PT];

/// Data of the language of `locale`, English when unknown.
pub fn locale_data(locale: &str) -> &'static LocaleData {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    ALL.into_iter()
        .find(|data| data.language == language)
        .unwrap_or(&EN)
}

/// Symbol and default fraction digits of a currency code.
pub fn currency_symbol(code: &str) -> (&str, usize) {
    match code {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "CAD" => ("CA$", 2),
        "HUF" => ("HUF", 2),
        _ => (code, 2),
    }
}

/// Display names in English, French, German and Spanish.
pub type NameRow = (&'static str, [&'static str; 4]);

/// Region names by ISO 3166 code.
pub const REGIONS: &[NameRow] = &[
    ("AT", ["Austria", "Autriche", "Österreich", "Austria"]),
    ("BE", ["Belgium", "Belgique", "Belgien", "Bélgica"]),
    ("BR", ["Brazil", "Brésil", "Brasilien", "Brasil"]),
    ("CA", ["Canada", "Canada", "Kanada", "Canadá"]),
    ("CH", ["Switzerland", "Suisse", "Schweiz", "Suiza"]),
    ("CN", ["China", "Chine", "China", "China"]),
    ("DE", ["Germany", "Allemagne", "Deutschland", "Alemania"]),
    ("ES", ["Spain", "Espagne", "Spanien", "España"]),
    ("FR", ["France", "France", "Frankreich", "Francia"]),
    ("GB", ["United Kingdom", "Royaume-Uni", "Vereinigtes Königreich", "Reino Unido"]),
    ("HU", ["Hungary", "Hongrie", "Ungarn", "Hungría"]),
    ("IT", ["Italy", "Italie", "Italien", "Italia"]),
    ("JP", ["Japan", "Japon", "Japan", "Japón"]),
    ("MX", ["Mexico", "Mexique", "Mexiko", "México"]),
    ("NL", ["Netherlands", "Pays-Bas", "Niederlande", "Países Bajos"]),
    ("PT", ["Portugal", "Portugal", "Portugal", "Portugal"]),
    ("US", ["United States", "États-Unis", "Vereinigte Staaten", "Estados Unidos"]),
];

/// Language names, including the variants with a name of their own.
pub const LANGUAGES: &[NameRow] = &[
    ("de", ["German", "allemand", "Deutsch", "alemán"]),
    ("en", ["English", "anglais", "Englisch", "inglés"]),
    ("en-GB", ["British English", "anglais britannique", "Britisches Englisch", "inglés británico"]),
    ("en-US", ["American English", "anglais américain", "Amerikanisches Englisch", "inglés estadounidense"]),
    ("es", ["Spanish", "espagnol", "Spanisch", "español"]),
    ("es-MX", ["Mexican Spanish", "espagnol du Mexique", "Mexikanisches Spanisch", "español de México"]),
    ("fr", ["French", "français", "Französisch", "francés"]),
    ("fr-CA", ["Canadian French", "français canadien", "Kanadisches Französisch", "francés canadiense"]),
    ("hu", ["Hungarian", "hongrois", "Ungarisch", "húngaro"]),
    ("it", ["Italian", "italien", "Italienisch", "italiano"]),
    ("ja", ["Japanese", "japonais", "Japanisch", "japonés"]),
    ("nl", ["Dutch", "néerlandais", "Niederländisch", "neerlandés"]),
    ("pt", ["Portuguese", "portugais", "Portugiesisch", "portugués"]),
    ("pt-BR", ["Brazilian Portuguese", "portugais brésilien", "Brasilianisches Portugiesisch", "portugués de Brasil"]),
    ("zh", ["Chinese", "chinois", "Chinesisch", "chino"]),
];

/// Script names by ISO 15924 code.
pub const SCRIPTS: &[NameRow] = &[
    ("Arab", ["Arabic", "arabe", "Arabisch", "árabe"]),
    ("Cyrl", ["Cyrillic", "cyrillique", "Kyrillisch", "cirílico"]),
    ("Grek", ["Greek", "grec", "Griechisch", "griego"]),
    ("Hans", ["Simplified Han", "sinogrammes simplifiés", "Vereinfachtes Chinesisch", "han simplificado"]),
    ("Hant", ["Traditional Han", "sinogrammes traditionnels", "Traditionelles Chinesisch", "han tradicional"]),
    ("Latn", ["Latin", "latin", "Lateinisch", "latino"]),
];

/// Currency names by ISO 4217 code.
pub const CURRENCIES: &[NameRow] = &[
    ("CAD", ["Canadian Dollar", "dollar canadien", "Kanadischer Dollar", "dólar canadiense"]),
    ("CHF", ["Swiss Franc", "franc suisse", "Schweizer Franken", "franco suizo"]),
    ("EUR", ["Euro", "euro", "Euro", "euro"]),
    ("GBP", ["British Pound", "livre sterling", "Britisches Pfund", "libra esterlina"]),
    ("HUF", ["Hungarian Forint", "forint hongrois", "Ungarischer Forint", "forinto húngaro"]),
    ("JPY", ["Japanese Yen", "yen japonais", "Japanischer Yen", "yen"]),
    ("USD", ["US Dollar", "dollar des États-Unis", "US-Dollar", "dólar estadounidense"]),
];

/// Looks `code` up in a name table.
pub fn lookup_name(table: &[NameRow], code: &str, column: usize) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, names)| names[column])
}
