//! Usage and version text.

use crate::archive::Platform;
use crate::displayout;

use super::constants::{
    DEFAULT_BIN, DEFAULT_FILTER, DEFAULT_INI, DEFAULT_LEVEL, DEFAULT_MAP, DEFAULT_PLATFORM,
    DEFAULT_UTF, PROGRAM_DESC, PROGRAM_NAME, PROGRAM_VERSION,
};

pub fn print_version() {
    displayout!(
        "\n{PROGRAM_NAME} ({PROGRAM_DESC}) {PROGRAM_VERSION}\n\
         License MIT: The MIT License <http://opensource.org/licenses/MIT>.\n\
         This is free software: you are free to change and redistribute it.\n\
         There is NO WARRANTY, to the extent permitted by law.\n\n"
    );
}

pub fn print_help() {
    displayout!("\nUsage: {PROGRAM_NAME} <command [argument]...>...\n\n");
    displayout!("  The commands are executed in command line order.\n");
    displayout!("  Therefore, everything after --exit is ignored.\n\n");
    displayout!("Commands:\n\n");
    displayout!("  --version                                print program version\n");
    displayout!("  --help                                   print this help\n");
    displayout!("  --exit                                   exit the program now\n");
    displayout!("  --clear                                  reset string table state\n");
    displayout!("  --read-ini [ini]                         add prefix/csv from <ini>\n");
    displayout!("  --read-csv [utf]                         add strings from all csv\n");
    displayout!("  --save-map [map]                         save [prefix:]id to <map>\n");
    displayout!("  --save-bin [plt] [ver] [bin] [cmp] [flt] save string table to <bin>\n");
    displayout!("  --read-map [map]                         add [prefix:]id from <map>\n");
    displayout!("  --read-bin [bin]                         add csv/strings from <bin>\n");
    displayout!("  --save-csv                               save strings to all csv\n\n");
    displayout!("Defaults:\n\n");
    displayout!("  <ini>  {DEFAULT_INI}\n");
    displayout!("  <utf>  {DEFAULT_UTF}\n");
    displayout!("  <map>  {DEFAULT_MAP}\n");
    displayout!("  <plt>  {}\n", DEFAULT_PLATFORM.name());
    displayout!("  <ver>  5 (big-endian platforms) / 6\n");
    displayout!("  <bin>  {DEFAULT_BIN}\n");
    displayout!("  <cmp>  {DEFAULT_LEVEL}\n");
    displayout!("  <flt>  {DEFAULT_FILTER}\n\n");
    displayout!("Platforms:\n\n");
    for p in Platform::ALL {
        displayout!("  {:<6}{}\n", p.name(), p.desc());
    }
    displayout!("\nMap format:\n\n");
    displayout!("  The map files are used to restore the string identifiers\n");
    displayout!("  (the binary string table contains only the hash values).\n\n");
    displayout!("  Map files have to be encoded in UTF-8 (BOM is optional).\n");
    displayout!("  Every non-empty line contains <[prefix:]id>[|...], where\n");
    displayout!("  the prefix is optional (used to select the unpacked CSV,\n");
    displayout!("  defaults to first CSV in loc.ini for unknown id hashes),\n");
    displayout!("  and everything after | will be ignored on read (hashes).\n\n");
    displayout!("CSV format:\n\n");
    displayout!("  The first line defines the case-insensitive column names.\n");
    displayout!("  The first row contains the case-insensitive string ids or\n");
    displayout!("  an eight-character, hexadecimal, and case-sensitive hash.\n\n");
    displayout!("  Without a BOM the encoding is detected based on the first\n");
    displayout!("  two octets (X,0 = UTF-16LE; 0,X = UTF-16BE; X,X = UTF-8).\n");
    displayout!("  This detection can be disabled with --read-csv 0.\n\n");
    displayout!("  Records are separated with a LINE FEED (U+000A), the NULL\n");
    displayout!("  (U+0000) is not allowed, and all CARRIAGE RETURN (U+000D)\n");
    displayout!("  are ignored during read. Record fields are separated with\n");
    displayout!("  VERTICAL LINE (U+007C), there's no field quote character,\n");
    displayout!("  leading and trailing white space is not removed, and only\n");
    displayout!("  the following escape sequences are available:\n");
    displayout!("    \"\\a\"  COMMERCIAL AT (U+0040)\n");
    displayout!("    \"\\n\"  LINE FEED (U+000A)\n");
    displayout!("    \"\\r\"  CARRIAGE RETURN (U+000D)\n");
    displayout!("    \"\\\\\"  REVERSE SOLIDUS (U+005C)\n");
    displayout!("    \"\\v\"  VERTICAL LINE (U+007C)\n\n");
    displayout!("Examples:\n\n");
    displayout!("  pack all CSVs from {DEFAULT_INI} into {DEFAULT_BIN}\n\n");
    displayout!("    {PROGRAM_NAME} --read-ini --read-csv --save-bin\n\n");
    displayout!("  export {DEFAULT_MAP} from the CSVs in {DEFAULT_INI}\n\n");
    displayout!("    {PROGRAM_NAME} --read-ini --read-csv --save-map\n\n");
    displayout!("  unpack {DEFAULT_BIN} with {DEFAULT_MAP}\n\n");
    displayout!("    {PROGRAM_NAME} --read-map --read-ini --read-bin --save-csv\n\n");
}
