use crate::error::{ApiError, ApiResult};
use garde::Validate;
use genres_dal::{ListingParams, Order};

const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Pageable query, `page` is zero based, `sort` can be repeated
/// and has form `field` or `field,asc` or `field,desc`
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[garde(allow_unvalidated)]
pub struct Paging {
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    size: Option<u32>,
    #[serde(default)]
    #[garde(length(max = 10), inner(length(max = 255)))]
    sort: Vec<String>,
}

impl Paging {
    pub fn into_listing_params(self, default_page_size: u32) -> ApiResult<ListingParams> {
        let page = self.page.unwrap_or(0);
        let page_size = self.page_size(default_page_size);
        let offset = i64::from(page) * i64::from(page_size);
        let params = ListingParams::new(offset, page_size.into());
        if self.sort.is_empty() {
            Ok(params)
        } else {
            let order = self
                .sort
                .iter()
                .map(|s| parse_ordering(s))
                .collect::<ApiResult<Vec<_>>>()?;
            Ok(params.with_order(order))
        }
    }

    pub fn page_size(&self, default_page_size: u32) -> u32 {
        self.size.unwrap_or(default_page_size)
    }
}

fn parse_ordering(sort: &str) -> ApiResult<Order> {
    let mut parts = sort.split(',').map(str::trim);
    let field_name = match parts.next() {
        None | Some("") => return Err(ApiError::InvalidQuery("Empty ordering name".to_string())),
        Some(name) if name.len() > MAX_FIELD_NAME_LENGTH => {
            return Err(ApiError::InvalidQuery("Ordering name too long".to_string()))
        }
        Some(name) => name.to_string(),
    };
    let descending = match parts.next() {
        None => false,
        Some(d) if d.eq_ignore_ascii_case("asc") => false,
        Some(d) if d.eq_ignore_ascii_case("desc") => true,
        Some(d) => {
            return Err(ApiError::InvalidQuery(format!(
                "Invalid ordering direction {d}"
            )))
        }
    };
    if parts.next().is_some() {
        return Err(ApiError::InvalidQuery(format!("Invalid ordering {sort}")));
    }

    Ok(if descending {
        Order::Desc(field_name)
    } else {
        Order::Asc(field_name)
    })
}
