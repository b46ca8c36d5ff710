//! Ask/tell session over the exchange client.

use serde_json::Value;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use cg_client::{ClientConfig, ExchangeClient, HttpTransport, Transport};
use cg_types::{
    measurement_table, validation_error, CgResult, ExchangeError, Measurement, Parameters, Schema,
    Table, METRIC_ESTIMATE_COLUMN,
};

use crate::tracking::{RunningBest, Scored};

/// Accumulates measurements and turns service designs into parameter
/// dictionaries.
///
/// A session is single-owner: `ask` and `tell` take `&mut self` and nothing
/// inside is locked. Share one across threads by wrapping it in a `Mutex`.
#[derive(Debug)]
pub struct AskTell<T = HttpTransport> {
    id: Uuid,
    schema: Schema,
    client: ExchangeClient<T>,
    measurements: Vec<Measurement>,
    favorite: Option<Scored>,
    best: RunningBest,
}

impl AskTell<HttpTransport> {
    /// Session over HTTP. `endpoint` overrides the default service URL.
    pub fn new<S: AsRef<str>>(param_defs: &[S], endpoint: Option<&str>) -> CgResult<Self> {
        let mut config = ClientConfig::default();
        if let Some(endpoint) = endpoint {
            config = config.with_endpoint(endpoint);
        }
        Self::with_config(param_defs, config)
    }

    pub fn with_config<S: AsRef<str>>(param_defs: &[S], config: ClientConfig) -> CgResult<Self> {
        let schema = Schema::parse(param_defs)?;
        Ok(Self::with_client(schema, ExchangeClient::new(config)?))
    }
}

impl<T: Transport> AskTell<T> {
    pub fn with_client(schema: Schema, client: ExchangeClient<T>) -> Self {
        let id = Uuid::new_v4();
        info!(
            "Created ask/tell session {} with {} parameters",
            id,
            schema.len()
        );
        Self {
            id,
            schema,
            client,
            measurements: Vec::new(),
            favorite: None,
            best: RunningBest::new(),
        }
    }

    /// Request `number_of_arms` new arms. The service decides how many it
    /// actually returns.
    pub fn ask(&mut self, number_of_arms: usize) -> CgResult<Vec<Parameters>> {
        let _span = info_span!("ask", session = %self.id).entered();

        let measurements = self.measurement_table()?;
        let response = self.client.request(&measurements, number_of_arms)?;

        let favorite = self.top_of_analysis(&response.analysis)?;
        let design = response
            .design
            .rows()
            .iter()
            .map(|row| self.schema.decode(row))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(favorite) = favorite {
            debug!("Favorite is now {:?} (metric_est {})", favorite.params, favorite.phi);
            self.favorite = Some(favorite);
        }
        info!("Asked for {} arms, received {}", number_of_arms, design.len());
        Ok(design)
    }

    /// Record observed metrics. `ses` defaults to unknown for every entry.
    ///
    /// The batch is all-or-nothing: if any entry fails to encode, nothing is
    /// recorded.
    pub fn tell(&mut self, params: &[Parameters], phis: &[f64], ses: Option<&[f64]>) -> CgResult<()> {
        let _span = info_span!("tell", session = %self.id).entered();

        if params.len() != phis.len() {
            return Err(validation_error!(
                "got {} parameter sets but {} metric values",
                params.len(),
                phis.len()
            ));
        }
        if let Some(ses) = ses {
            if ses.len() != phis.len() {
                return Err(validation_error!(
                    "got {} standard errors for {} metric values",
                    ses.len(),
                    phis.len()
                ));
            }
        }

        let rows = params
            .iter()
            .map(|p| self.schema.encode(p))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, (values, (p, &phi))) in rows.into_iter().zip(params.iter().zip(phis)).enumerate() {
            let se = ses.map(|ses| ses[i]);
            self.measurements.push(Measurement::new(values, phi, se));
            if self.best.offer(phi, p) {
                debug!("New best metric {}", phi);
            }
        }

        info!(
            "Told {} measurements ({} total)",
            phis.len(),
            self.measurements.len()
        );
        Ok(())
    }

    /// Top row of the most recent non-empty analysis.
    pub fn favorite(&self) -> Option<&Scored> {
        self.favorite.as_ref()
    }

    /// Largest metric told so far and its parameters.
    pub fn best(&self) -> Option<&Scored> {
        self.best.get()
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn client(&self) -> &ExchangeClient<T> {
        &self.client
    }

    /// The table the next `ask` will send.
    pub fn measurement_table(&self) -> CgResult<Table> {
        measurement_table(&self.schema, &self.measurements)
    }

    fn top_of_analysis(&self, analysis: &Table) -> CgResult<Option<Scored>> {
        let Some(row) = analysis.row(0) else {
            return Ok(None);
        };

        let phi = analysis
            .get(0, METRIC_ESTIMATE_COLUMN)
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .ok_or_else(|| ExchangeError::MalformedResponse {
                body: format!("analysis row 0 has no numeric '{METRIC_ESTIMATE_COLUMN}'"),
            })?;

        Ok(Some(Scored::new(phi, self.schema.decode(row)?)))
    }
}
