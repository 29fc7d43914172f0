use super::{
    connection::{ConnectOptions, Connection, ConnectionError, QueryParam},
    row::{Cell, Row},
};
use postgres::{Client, NoTls, types::ToSql, types::Type};
use tracing::debug;

///
/// PgConnection
///
/// [`Connection`] over a blocking `postgres` client.
///

pub struct PgConnection {
    client: Client,
}

impl PgConnection {
    /// Connect with a libpq-style connection string, applying the connect
    /// timeout and a session `statement_timeout`.
    pub fn connect(params: &str, options: &ConnectOptions) -> Result<Self, ConnectionError> {
        let mut config: postgres::Config = params.parse().map_err(connect_error)?;
        config.connect_timeout(options.connect_timeout);
        config.options(&format!(
            "-c statement_timeout={}",
            options.statement_timeout.as_millis()
        ));

        let client = config.connect(NoTls).map_err(connect_error)?;
        debug!(
            statement_timeout_ms = options.statement_timeout.as_millis(),
            "connected for catalogue introspection"
        );

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Connection for PgConnection {
    fn query(&mut self, sql: &str, params: &[QueryParam<'_>]) -> Result<Vec<Row>, ConnectionError> {
        let values: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|param| match param {
                QueryParam::Text(value) => value as &(dyn ToSql + Sync),
                QueryParam::Oid(value) => value as &(dyn ToSql + Sync),
            })
            .collect();

        let rows = self
            .client
            .query(sql, &values)
            .map_err(|err| ConnectionError::Query {
                message: err.to_string(),
            })?;

        rows.iter().map(decode_row).collect()
    }
}

fn decode_row(row: &postgres::Row) -> Result<Row, ConnectionError> {
    let mut cells = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        cells.push(decode_cell(row, index, column.type_())?);
    }

    Ok(Row::new(cells))
}

fn decode_cell(row: &postgres::Row, index: usize, ty: &Type) -> Result<Cell, ConnectionError> {
    let get_error = |err: postgres::Error| ConnectionError::Query {
        message: err.to_string(),
    };

    let cell: Cell = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index).map_err(get_error)?.into()
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)
            .map_err(get_error)?
            .map(i64::from)
            .into()
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)
            .map_err(get_error)?
            .map(i64::from)
            .into()
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index).map_err(get_error)?.into()
    } else if *ty == Type::OID {
        row.try_get::<_, Option<u32>>(index).map_err(get_error)?.into()
    } else if [Type::TEXT, Type::NAME, Type::VARCHAR, Type::BPCHAR].contains(ty) {
        row.try_get::<_, Option<String>>(index)
            .map_err(get_error)?
            .into()
    } else if *ty == Type::INT2_ARRAY {
        row.try_get::<_, Option<Vec<i16>>>(index)
            .map_err(get_error)?
            .map(|values| values.into_iter().map(i64::from).collect::<Vec<_>>())
            .into()
    } else {
        return Err(ConnectionError::UnsupportedType {
            index,
            type_name: ty.name().to_string(),
        });
    };

    Ok(cell)
}

fn connect_error(err: postgres::Error) -> ConnectionError {
    ConnectionError::Connect {
        message: err.to_string(),
    }
}
