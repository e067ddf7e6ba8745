// ───────────────────────────── Gazetteer ─────────────────────────────────

/// Gazetteer category of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    City,
    District,
    Area,
    Street,
    Keyword,
}

/// One gazetteer entry: the canonical tag put on records plus every way
/// channels spell it.
///
/// Aliases are written in normalized (lowercase) form. An alias ending in
/// `*` is a **stem**: it only needs a word boundary on the left, so Slavic
/// case endings still match (`дананг*` → `дананге`, `данангу`).
#[derive(Debug, Clone, Copy)]
pub struct Place {
    pub tag: &'static str,
    pub kind: LocationKind,
    pub aliases: &'static [&'static str],
}

const fn place(tag: &'static str, kind: LocationKind, aliases: &'static [&'static str]) -> Place {
    Place { tag, kind, aliases }
}

use LocationKind::{Area, City, District, Keyword, Street};

/// Each entry contains **Vietnamese (with and without diacritics), English
/// and Russian/Ukrainian** spellings. When two aliases overlap in a text,
/// the longer one wins, so compound names ("my an beach") beat the names
/// they contain ("my an", "beach").
pub const GAZETTEER: &[Place] = &[
    // ── Cities ─────────────────────────────────────────────────────────
    place("Da Nang", City, &["đà nẵng", "da nang", "danang", "дананг*", "дананґ*"]),
    place("Hoi An", City, &["hội an", "hoi an", "хойан*", "хой ан"]),
    place(
        "Ho Chi Minh City",
        City,
        &[
            "hồ chí minh",
            "ho chi minh",
            "ho chi minh city",
            "hcmc",
            "hcm",
            "tp.hcm",
            "tphcm",
            "sài gòn",
            "saigon",
            "sai gon",
            "сайгон*",
            "хошимин*",
            "хо ши мин*",
        ],
    ),
    place("Hanoi", City, &["hà nội", "ha noi", "hanoi", "ханой*", "ханої*"]),
    place("Nha Trang", City, &["nha trang", "нячанг*", "нья чанг*"]),
    place("Vung Tau", City, &["vũng tàu", "vung tau", "вунгтау", "вунг тау"]),
    place("Phu Quoc", City, &["phú quốc", "phu quoc", "фукуок*"]),
    place("Hue", City, &["huế", "hue", "хюэ", "хюе"]),
    place("Ha Long", City, &["hạ long", "ha long", "halong", "халонг*"]),
    place("Da Lat", City, &["đà lạt", "da lat", "dalat", "далат*"]),
    place("Quy Nhon", City, &["quy nhơn", "quy nhon", "куинён*", "куинен*", "квинён*"]),
    place("Mui Ne", City, &["mũi né", "mui ne", "муйне", "муй не"]),
    // ── Districts (Da Nang) ─────────────────────────────────────────────
    place("Hai Chau", District, &["hải châu", "hai chau", "хай чау", "хайчау"]),
    place("Son Tra", District, &["sơn trà", "son tra", "шон ча", "сон тра", "сонтра"]),
    place(
        "Ngu Hanh Son",
        District,
        &["ngũ hành sơn", "ngu hanh son", "нгу хань шон", "нгу хань сон"],
    ),
    place("Thanh Khe", District, &["thanh khê", "thanh khe", "тхань кхе"]),
    place("Lien Chieu", District, &["liên chiểu", "lien chieu", "льен тьеу"]),
    place("Cam Le", District, &["cẩm lệ", "cam le", "кам ле"]),
    place("Hoa Vang", District, &["hòa vang", "hoà vang", "hoa vang"]),
    // ── Districts (Ho Chi Minh City) ────────────────────────────────────
    place("Binh Thanh", District, &["bình thạnh", "binh thanh", "бинь тхань"]),
    place("Phu Nhuan", District, &["phú nhuận", "phu nhuan"]),
    place("Thu Duc", District, &["thủ đức", "thu duc", "тху дык"]),
    // ── Named areas ────────────────────────────────────────────────────
    place("My An", Area, &["mỹ an", "my an", "ми ан", "мі ан"]),
    place(
        "My An Beach",
        Area,
        &["bãi biển mỹ an", "my an beach", "пляж ми ан", "пляж мі ан"],
    ),
    place("My Khe", Area, &["mỹ khê", "my khe", "ми кхе", "мі кхе"]),
    place(
        "My Khe Beach",
        Area,
        &["bãi biển mỹ khê", "my khe beach", "пляж ми кхе", "пляж мі кхе"],
    ),
    place("An Thuong", Area, &["an thượng", "an thuong", "ан тхыонг", "ан тхуонг"]),
    place("Khue My", Area, &["khuê mỹ", "khue my", "кхуе ми"]),
    place("Hoa Hai", Area, &["hòa hải", "hoà hải", "hoa hai", "хоа хай"]),
    place("An Hai", Area, &["an hải", "an hai", "ан хай"]),
    place("Phuoc My", Area, &["phước mỹ", "phuoc my", "фуок ми"]),
    place("Man Thai", Area, &["mân thái", "man thai", "ман тхай"]),
    place("Tho Quang", Area, &["thọ quang", "tho quang", "тхо куанг"]),
    place(
        "Son Tra Peninsula",
        Area,
        &["bán đảo sơn trà", "son tra peninsula", "полуостров сон тра", "півострів сон тра"],
    ),
    place("An Bang", Area, &["an bàng", "an bang", "ан банг"]),
    place("Cam Thanh", Area, &["cẩm thanh", "cam thanh"]),
    place("Thao Dien", Area, &["thảo điền", "thao dien", "тхао дьен"]),
    place("Phu My Hung", Area, &["phú mỹ hưng", "phu my hung", "фу ми хынг"]),
    // ── Streets ────────────────────────────────────────────────────────
    place("Tran Phu", Street, &["trần phú", "tran phu", "чан фу"]),
    place("Bach Dang", Street, &["bạch đằng", "bach dang", "бать данг"]),
    place("Vo Nguyen Giap", Street, &["võ nguyên giáp", "vo nguyen giap", "во нгуен зиап"]),
    place("Hoang Ke Viem", Street, &["hoàng kế viêm", "hoang ke viem"]),
    place("Ho Xuan Huong", Street, &["hồ xuân hương", "ho xuan huong"]),
    place("Nguyen Van Thoai", Street, &["nguyễn văn thoại", "nguyen van thoai"]),
    place("An Thuong 2", Street, &["an thượng 2", "an thuong 2"]),
    // ── Generic keywords ───────────────────────────────────────────────
    place("Beach", Keyword, &["beach", "bãi biển", "пляж*", "біля моря", "у моря"]),
    place(
        "City Center",
        Keyword,
        &["city center", "city centre", "downtown", "trung tâm", "центр*"],
    ),
    place("Old Town", Keyword, &["old town", "phố cổ", "старый город", "старе місто"]),
    place("River", Keyword, &["riverside", "river view", "bờ sông", "набережн*"]),
];

/// Numbered district prefixes (`district 1`, `quận 7`, `q.3`, `район 5`).
/// Matched by pattern in the location extractor, tagged `District N`.
pub const NUMBERED_DISTRICT_PREFIXES: &[&str] = &["district", "quận", "quan", "q.", "район"];
