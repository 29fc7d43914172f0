//! Fixed PostgreSQL type oids.
//!
//! Extension types (`hstore`, ...) have no fixed oid and are looked up by
//! name at check time.

use super::Oid;

pub const BOOL: Oid = 16;
pub const BYTEA: Oid = 17;
pub const CHAR: Oid = 18;
pub const NAME: Oid = 19;
pub const INT8: Oid = 20;
pub const INT2: Oid = 21;
pub const INT2VECTOR: Oid = 22;
pub const INT4: Oid = 23;
pub const TEXT: Oid = 25;
pub const OID: Oid = 26;
pub const OIDVECTOR: Oid = 30;
pub const JSON: Oid = 114;
pub const XML: Oid = 142;
pub const POINT: Oid = 600;
pub const LSEG: Oid = 601;
pub const PATH: Oid = 602;
pub const BOX: Oid = 603;
pub const POLYGON: Oid = 604;
pub const LINE: Oid = 628;
pub const CIDR: Oid = 650;
pub const FLOAT4: Oid = 700;
pub const FLOAT8: Oid = 701;
pub const UNKNOWN: Oid = 705;
pub const CIRCLE: Oid = 718;
pub const MACADDR8: Oid = 774;
pub const MONEY: Oid = 790;
pub const MACADDR: Oid = 829;
pub const INET: Oid = 869;
pub const BPCHAR: Oid = 1042;
pub const VARCHAR: Oid = 1043;
pub const DATE: Oid = 1082;
pub const TIME: Oid = 1083;
pub const TIMESTAMP: Oid = 1114;
pub const TIMESTAMPTZ: Oid = 1184;
pub const INTERVAL: Oid = 1186;
pub const TIMETZ: Oid = 1266;
pub const BIT: Oid = 1560;
pub const VARBIT: Oid = 1562;
pub const NUMERIC: Oid = 1700;
pub const UUID: Oid = 2950;
pub const TSVECTOR: Oid = 3614;
pub const TSQUERY: Oid = 3615;
pub const JSONB: Oid = 3802;
pub const INT4RANGE: Oid = 3904;
pub const NUMRANGE: Oid = 3906;
pub const TSRANGE: Oid = 3908;
pub const TSTZRANGE: Oid = 3910;
pub const DATERANGE: Oid = 3912;
pub const INT8RANGE: Oid = 3926;

// pseudo-types
pub const ANY: Oid = 2276;
pub const ANYARRAY: Oid = 2277;
pub const ANYELEMENT: Oid = 2283;
pub const ANYENUM: Oid = 3500;
pub const ANYRANGE: Oid = 3831;

// arrays
pub const XML_ARRAY: Oid = 143;
pub const JSON_ARRAY: Oid = 199;
pub const CIDR_ARRAY: Oid = 651;
pub const CIRCLE_ARRAY: Oid = 719;
pub const MONEY_ARRAY: Oid = 791;
pub const BOOL_ARRAY: Oid = 1000;
pub const BYTEA_ARRAY: Oid = 1001;
pub const CHAR_ARRAY: Oid = 1002;
pub const NAME_ARRAY: Oid = 1003;
pub const INT2_ARRAY: Oid = 1005;
pub const INT2VECTOR_ARRAY: Oid = 1006;
pub const INT4_ARRAY: Oid = 1007;
pub const TEXT_ARRAY: Oid = 1009;
pub const OIDVECTOR_ARRAY: Oid = 1013;
pub const BPCHAR_ARRAY: Oid = 1014;
pub const VARCHAR_ARRAY: Oid = 1015;
pub const INT8_ARRAY: Oid = 1016;
pub const POINT_ARRAY: Oid = 1017;
pub const LSEG_ARRAY: Oid = 1018;
pub const PATH_ARRAY: Oid = 1019;
pub const BOX_ARRAY: Oid = 1020;
pub const FLOAT4_ARRAY: Oid = 1021;
pub const FLOAT8_ARRAY: Oid = 1022;
pub const POLYGON_ARRAY: Oid = 1027;
pub const OID_ARRAY: Oid = 1028;
pub const MACADDR_ARRAY: Oid = 1040;
pub const INET_ARRAY: Oid = 1041;
pub const TIMESTAMP_ARRAY: Oid = 1115;
pub const DATE_ARRAY: Oid = 1182;
pub const TIME_ARRAY: Oid = 1183;
pub const TIMESTAMPTZ_ARRAY: Oid = 1185;
pub const INTERVAL_ARRAY: Oid = 1187;
pub const NUMERIC_ARRAY: Oid = 1231;
pub const TIMETZ_ARRAY: Oid = 1270;
pub const BIT_ARRAY: Oid = 1561;
pub const VARBIT_ARRAY: Oid = 1563;
pub const UUID_ARRAY: Oid = 2951;
pub const TSVECTOR_ARRAY: Oid = 3643;
pub const TSQUERY_ARRAY: Oid = 3645;
pub const JSONB_ARRAY: Oid = 3807;
pub const INT4RANGE_ARRAY: Oid = 3905;
pub const NUMRANGE_ARRAY: Oid = 3907;
pub const TSRANGE_ARRAY: Oid = 3909;
pub const TSTZRANGE_ARRAY: Oid = 3911;
pub const DATERANGE_ARRAY: Oid = 3913;
pub const INT8RANGE_ARRAY: Oid = 3927;
pub const MACADDR8_ARRAY: Oid = 775;
