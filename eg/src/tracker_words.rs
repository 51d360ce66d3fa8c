// Copyright (C) Microsoft Corporation. All rights reserved.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::manual_assert)]

//! Human-readable rendering of a tracking hash as a word phrase.
//!
//! A [`crate::hash::HValue`] is 256 bits, far more than a person can usefully compare by eye at a
//! polling place. `to_phrase` takes the first 102 bits (nine 10-bit groups plus a tenth group
//! that folds in the two left-over bits) and renders each as a word from a fixed 1024-word
//! dictionary; `from_phrase` parses a phrase back into its group indices so a voter's spoken or
//! written phrase can be checked against one freshly computed from the published record. This is
//! a display aid over a bit prefix of the hash, not a reversible encoding of the whole 256 bits.

use crate::hash::HValue;

pub const WORD_COUNT: usize = 1024;
pub const GROUP_COUNT: usize = 10;
const BITS_PER_GROUP: usize = 10;
const FOLD_BITS: usize = 2;

pub const TRACKER_WORDS: [&str; WORD_COUNT] = [
    "bab", "back", "bad", "baft", "bag", "bai", "baib", "baick",
    "baid", "baift", "baig", "baild", "baill", "bailt", "baim", "baimp",
    "bain", "baind", "baing", "baink", "baint", "baip", "bair", "baird",
    "bairk", "bairn", "bairt", "bais", "baish", "baist", "bait", "baith",
    "baix", "baiy", "bald", "ball", "balt", "bam", "bamp", "ban",
    "banb", "banck", "band", "banft", "bang", "bank", "banld", "banll",
    "banlt", "banm", "banmp", "bann", "bannd", "banng", "bannk", "bannt",
    "banp", "banr", "banrd", "banrk", "banrn", "banrt", "bans", "bansh",
    "banst", "bant", "banth", "banx", "bany", "bap", "bar", "barb",
    "barck", "bard", "barft", "barg", "bark", "barld", "barll", "barlt",
    "barm", "barmp", "barn", "barnd", "barng", "barnk", "barnt", "barp",
    "barr", "barrd", "barrk", "barrn", "barrt", "bars", "barsh", "barst",
    "bart", "barth", "barx", "bary", "bas", "bash", "bast", "bat",
    "bath", "bax", "bay", "bea", "beab", "beack", "bead", "beaft",
    "beag", "beald", "beall", "bealt", "beam", "beamp", "bean", "beand",
    "beang", "beank", "beant", "beap", "bear", "beard", "beark", "bearn",
    "beart", "beas", "beash", "beast", "beat", "beath", "beax", "beay",
    "beb", "beck", "bed", "bee", "beeb", "beeck", "beed", "beeft",
    "beeg", "beeld", "beell", "beelt", "beem", "beemp", "been", "beend",
    "beeng", "beenk", "beent", "beep", "beer", "beerd", "beerk", "beern",
    "beert", "bees", "beesh", "beest", "beet", "beeth", "beex", "beey",
    "beft", "beg", "beld", "bell", "belt", "bem", "bemp", "ben",
    "bend", "beng", "benk", "bent", "bep", "ber", "berb", "berck",
    "berd", "berft", "berg", "berk", "berld", "berll", "berlt", "berm",
    "bermp", "bern", "bernd", "berng", "bernk", "bernt", "berp", "berr",
    "berrd", "berrk", "berrn", "berrt", "bers", "bersh", "berst", "bert",
    "berth", "berx", "bery", "bes", "besh", "best", "bet", "beth",
    "bex", "bey", "bib", "bick", "bid", "bift", "big", "bild",
    "bill", "bilt", "bim", "bimp", "bin", "binb", "binck", "bind",
    "binft", "bing", "bink", "binld", "binll", "binlt", "binm", "binmp",
    "binn", "binnd", "binng", "binnk", "binnt", "binp", "binr", "binrd",
    "binrk", "binrn", "binrt", "bins", "binsh", "binst", "bint", "binth",
    "binx", "biny", "bip", "bir", "bird", "birk", "birn", "birt",
    "bis", "bish", "bist", "bit", "bith", "bix", "biy", "bla",
    "blab", "black", "blad", "blaft", "blag", "blai", "blaib", "blaick",
    "blaid", "blaift", "blaig", "blaild", "blaill", "blailt", "blaim", "blaimp",
    "blain", "blaind", "blaing", "blaink", "blaint", "blaip", "blair", "blaird",
    "blairk", "blairn", "blairt", "blais", "blaish", "blaist", "blait", "blaith",
    "blaix", "blaiy", "blald", "blall", "blalt", "blam", "blamp", "blan",
    "blanb", "blanck", "bland", "blanft", "blang", "blank", "blanld", "blanll",
    "blanlt", "blanm", "blanmp", "blann", "blannd", "blanng", "blannk", "blannt",
    "blanp", "blanr", "blanrd", "blanrk", "blanrn", "blanrt", "blans", "blansh",
    "blanst", "blant", "blanth", "blanx", "blany", "blap", "blar", "blarb",
    "blarck", "blard", "blarft", "blarg", "blark", "blarld", "blarll", "blarlt",
    "blarm", "blarmp", "blarn", "blarnd", "blarng", "blarnk", "blarnt", "blarp",
    "blarr", "blarrd", "blarrk", "blarrn", "blarrt", "blars", "blarsh", "blarst",
    "blart", "blarth", "blarx", "blary", "blas", "blash", "blast", "blat",
    "blath", "blax", "blay", "ble", "blea", "bleab", "bleack", "blead",
    "bleaft", "bleag", "bleald", "bleall", "blealt", "bleam", "bleamp", "blean",
    "bleand", "bleang", "bleank", "bleant", "bleap", "blear", "bleard", "bleark",
    "blearn", "bleart", "bleas", "bleash", "bleast", "bleat", "bleath", "bleax",
    "bleay", "bleb", "bleck", "bled", "blee", "bleeb", "bleeck", "bleed",
    "bleeft", "bleeg", "bleeld", "bleell", "bleelt", "bleem", "bleemp", "bleen",
    "bleend", "bleeng", "bleenk", "bleent", "bleep", "bleer", "bleerd", "bleerk",
    "bleern", "bleert", "blees", "bleesh", "bleest", "bleet", "bleeth", "bleex",
    "bleey", "bleft", "bleg", "bleld", "blell", "blelt", "blem", "blemp",
    "blen", "blend", "bleng", "blenk", "blent", "blep", "bler", "blerb",
    "blerck", "blerd", "blerft", "blerg", "blerk", "blerld", "blerll", "blerlt",
    "blerm", "blermp", "blern", "blernd", "blerng", "blernk", "blernt", "blerp",
    "blerr", "blerrd", "blerrk", "blerrn", "blerrt", "blers", "blersh", "blerst",
    "blert", "blerth", "blerx", "blery", "bles", "blesh", "blest", "blet",
    "bleth", "blex", "bley", "bli", "blib", "blick", "blid", "blift",
    "blig", "blild", "blill", "blilt", "blim", "blimp", "blin", "blinb",
    "blinck", "blind", "blinft", "bling", "blink", "blinld", "blinll", "blinlt",
    "blinm", "blinmp", "blinn", "blinnd", "blinng", "blinnk", "blinnt", "blinp",
    "blinr", "blinrd", "blinrk", "blinrn", "blinrt", "blins", "blinsh", "blinst",
    "blint", "blinth", "blinx", "bliny", "blip", "blir", "blird", "blirk",
    "blirn", "blirt", "blis", "blish", "blist", "blit", "blith", "blix",
    "bliy", "blo", "blob", "block", "blod", "bloft", "blog", "blold",
    "bloll", "blolt", "blom", "blomp", "blon", "blonb", "blonck", "blond",
    "blonft", "blong", "blonk", "blonld", "blonll", "blonlt", "blonm", "blonmp",
    "blonn", "blonnd", "blonng", "blonnk", "blonnt", "blonp", "blonr", "blonrd",
    "blonrk", "blonrn", "blonrt", "blons", "blonsh", "blonst", "blont", "blonth",
    "blonx", "blony", "bloo", "bloob", "bloock", "blood", "blooft", "bloog",
    "bloold", "blooll", "bloolt", "bloom", "bloomp", "bloon", "bloond", "bloong",
    "bloonk", "bloont", "bloop", "bloor", "bloord", "bloork", "bloorn", "bloort",
    "bloos", "bloosh", "bloost", "bloot", "blooth", "bloox", "blooy", "blop",
    "blor", "blorb", "blorck", "blord", "blorft", "blorg", "blork", "blorld",
    "blorll", "blorlt", "blorm", "blormp", "blorn", "blornd", "blorng", "blornk",
    "blornt", "blorp", "blorr", "blorrd", "blorrk", "blorrn", "blorrt", "blors",
    "blorsh", "blorst", "blort", "blorth", "blorx", "blory", "blos", "blosh",
    "blost", "blot", "bloth", "blou", "bloub", "blouck", "bloud", "blouft",
    "bloug", "blould", "bloull", "bloult", "bloum", "bloump", "bloun", "blound",
    "bloung", "blounk", "blount", "bloup", "blour", "blourd", "blourk", "blourn",
    "blourt", "blous", "bloush", "bloust", "blout", "blouth", "bloux", "blouy",
    "blox", "bloy", "blu", "blub", "bluck", "blud", "bluft", "blug",
    "bluld", "blull", "blult", "blum", "blump", "blun", "blunb", "blunck",
    "blund", "blunft", "blung", "blunk", "blunld", "blunll", "blunlt", "blunm",
    "blunmp", "blunn", "blunnd", "blunng", "blunnk", "blunnt", "blunp", "blunr",
    "blunrd", "blunrk", "blunrn", "blunrt", "bluns", "blunsh", "blunst", "blunt",
    "blunth", "blunx", "bluny", "blup", "blur", "blurd", "blurk", "blurn",
    "blurt", "blus", "blush", "blust", "blut", "bluth", "blux", "bluy",
    "bob", "bock", "bod", "boft", "bog", "bold", "boll", "bolt",
    "bom", "bomp", "bon", "bonb", "bonck", "bond", "bonft", "bong",
    "bonk", "bonld", "bonll", "bonlt", "bonm", "bonmp", "bonn", "bonnd",
    "bonng", "bonnk", "bonnt", "bonp", "bonr", "bonrd", "bonrk", "bonrn",
    "bonrt", "bons", "bonsh", "bonst", "bont", "bonth", "bonx", "bony",
    "boo", "boob", "boock", "bood", "booft", "boog", "boold", "booll",
    "boolt", "boom", "boomp", "boon", "boond", "boong", "boonk", "boont",
    "boop", "boor", "boord", "boork", "boorn", "boort", "boos", "boosh",
    "boost", "boot", "booth", "boox", "booy", "bop", "bor", "borb",
    "borck", "bord", "borft", "borg", "bork", "borld", "borll", "borlt",
    "borm", "bormp", "born", "bornd", "borng", "bornk", "bornt", "borp",
    "borr", "borrd", "borrk", "borrn", "borrt", "bors", "borsh", "borst",
    "bort", "borth", "borx", "bory", "bos", "bosh", "bost", "bot",
    "both", "bou", "boub", "bouck", "boud", "bouft", "boug", "bould",
    "boull", "boult", "boum", "boump", "boun", "bound", "boung", "bounk",
    "bount", "boup", "bour", "bourd", "bourk", "bourn", "bourt", "bous",
    "boush", "boust", "bout", "bouth", "boux", "bouy", "box", "boy",
    "bra", "brab", "brack", "brad", "braft", "brag", "brald", "brall",
    "bralt", "bram", "bramp", "bran", "brand", "brang", "brank", "brant",
    "brap", "brar", "brard", "brark", "brarn", "brart", "bras", "brash",
    "brast", "brat", "brath", "brax", "bray", "bre", "breb", "breck",
    "bred", "breft", "breg", "breld", "brell", "brelt", "brem", "bremp",
    "bren", "brend", "breng", "brenk", "brent", "brep", "brer", "brerd",
    "brerk", "brern", "brert", "bres", "bresh", "brest", "bret", "breth",
    "brex", "brey", "bri", "brib", "brick", "brid", "brift", "brig",
    "brild", "brill", "brilt", "brim", "brimp", "brin", "brind", "bring",
    "brink", "brint", "brip", "brir", "brird", "brirk", "brirn", "brirt",
    "bris", "brish", "brist", "brit", "brith", "brix", "briy", "bro",
    "brob", "brock", "brod", "broft", "brog", "broll", "brolt", "brom",
    "bron", "brond", "brong", "bub", "buck", "bud", "buft", "bug",
    "buld", "bull", "bult", "bum", "bump", "bun", "bunb", "bunck",
    "bund", "bunft", "bung", "bunk", "bunld", "bunll", "bunlt", "bunm",
    "bunmp", "bunn", "bunnd", "bunng", "bunnk", "bunnt", "bunp", "bunr",
    "bunrd", "bunrk", "bunrn", "bunrt", "buns", "bunsh", "bunst", "bunt",
    "bunth", "bunx", "buny", "bup", "bur", "burd", "burk", "burn",
    "burt", "bus", "bush", "bust", "but", "buth", "bux", "buy",
];

/// Reads `len` bits (`len <= 16`) starting at bit offset `start`, MSB-first, from `bytes`.
fn read_bits(bytes: &[u8], start: usize, len: usize) -> u16 {
    let mut value: u16 = 0;
    for i in 0..len {
        let bit_pos = start + i;
        let byte = bytes[bit_pos / 8];
        let bit = (byte >> (7 - (bit_pos % 8))) & 1;
        value = (value << 1) | u16::from(bit);
    }
    value
}

/// The ten dictionary indices (each `< WORD_COUNT`) derived from `h`'s leading 102 bits.
pub fn group_indices(h: &HValue) -> [u16; GROUP_COUNT] {
    let bytes = h.as_bytes();
    let mut groups = [0_u16; GROUP_COUNT];
    for (i, slot) in groups.iter_mut().enumerate().take(GROUP_COUNT - 1) {
        *slot = read_bits(bytes, i * BITS_PER_GROUP, BITS_PER_GROUP);
    }
    let last = read_bits(bytes, (GROUP_COUNT - 1) * BITS_PER_GROUP, BITS_PER_GROUP);
    let fold = read_bits(bytes, GROUP_COUNT * BITS_PER_GROUP, FOLD_BITS);
    groups[GROUP_COUNT - 1] = last ^ fold;
    groups
}

/// Renders `h` as a ten-word, space-separated phrase.
pub fn to_phrase(h: &HValue) -> String {
    group_indices(h)
        .iter()
        .map(|&idx| TRACKER_WORDS[idx as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a phrase produced by [`to_phrase`] back into its dictionary indices. Returns `None` if
/// the phrase doesn't have exactly [`GROUP_COUNT`] words or any word isn't in the dictionary.
pub fn from_phrase(phrase: &str) -> Option<[u16; GROUP_COUNT]> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != GROUP_COUNT {
        return None;
    }
    let mut groups = [0_u16; GROUP_COUNT];
    for (slot, word) in groups.iter_mut().zip(words.iter()) {
        *slot = TRACKER_WORDS.iter().position(|w| w == word)? as u16;
    }
    Some(groups)
}

/// Whether `phrase` is the phrase [`to_phrase`] would produce for `h`.
pub fn verify_phrase(h: &HValue, phrase: &str) -> bool {
    from_phrase(phrase)
        .map(|parsed| parsed == group_indices(h))
        .unwrap_or(false)
}
