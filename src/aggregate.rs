use std::{collections::BTreeMap, io};

use futures::{stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use tracing::{instrument, Level};
use url::Url;

use crate::{
    config::Config,
    error::Error,
    fetch::{detail_url, fetch_page, location_url},
    menu::{DateKey, Location},
    parse::{LocationDayRecord, MenuPage, NutritionFacts},
};

/// Every scraped menu of one run, keyed by date and then location.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AggregateResult(BTreeMap<DateKey, BTreeMap<Location, LocationDayRecord>>);

impl AggregateResult {
    pub fn insert(&mut self, date: DateKey, location: Location, record: LocationDayRecord) {
        self.0.entry(date).or_default().insert(location, record);
    }

    #[cfg(test)]
    pub fn get(&self, date: DateKey, location: Location) -> Option<&LocationDayRecord> {
        self.0.get(&date)?.get(&location)
    }

    #[cfg(test)]
    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.0.keys().copied()
    }

    #[cfg(test)]
    pub fn locations(&self, date: DateKey) -> impl Iterator<Item = Location> + '_ {
        self.0.get(&date).into_iter().flat_map(|l| l.keys().copied())
    }

    /// Number of (date, location) records present.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON indented by four spaces with every non-ASCII character written
    /// as a `\uXXXX` escape, the form stored in `meal_data`.
    pub fn to_transport_string(&self) -> crate::Result<String> {
        let mut buf = Vec::with_capacity(64 * 1024);
        let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buf).expect("serde_json always writes utf-8"))
    }

    #[cfg(test)]
    pub fn from_transport_string(s: &str) -> crate::Result<Self> {
        serde_json::from_str(s).map_err(From::from)
    }
}

/// `PrettyFormatter` layout, but strings only ever contain ASCII.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if c.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            // astral characters become a surrogate pair
            let mut units = [0_u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

/// Scrapes every (date, location) menu page plus the label page of each dish on it.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    client: &'a Client,
    host: &'a Url,
    workers: usize,
    fail_fast: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(client: &'a Client, config: &'a Config) -> Self {
        Self {
            client,
            host: &config.menu_host,
            workers: config.workers.max(1),
            fail_fast: config.fail_fast,
        }
    }

    /// At most `workers` pages are in flight at once. A failed (date,
    /// location) pair is logged and left out of the result, unless the
    /// aggregator is fail-fast in which case the first failure is returned.
    pub async fn run(
        &self,
        dates: &[DateKey],
        locations: &[Location],
    ) -> crate::Result<AggregateResult> {
        // collected so the run future does not borrow `locations` across awaits
        let units: Vec<(DateKey, Location)> = dates
            .iter()
            .flat_map(|&date| locations.iter().map(move |&location| (date, location)))
            .collect();
        let mut finished = stream::iter(units)
            .map(|(date, location)| async move {
                (date, location, self.fetch_unit(date, location).await)
            })
            .buffer_unordered(self.workers);

        let start = std::time::Instant::now();
        let mut aggregate = AggregateResult::default();
        let mut skipped = 0_usize;
        while let Some((date, location, result)) = finished.next().await {
            match result {
                Ok(record) => aggregate.insert(date, location, record),
                Err(e) if self.fail_fast => return Err(e),
                Err(e) => {
                    skipped += 1;
                    log::warn!("Skipping {location} on {date}: {e}");
                }
            }
        }
        log::info!(
            "Aggregated {} menus ({skipped} skipped) in {:?}",
            aggregate.len(),
            start.elapsed()
        );
        Ok(aggregate)
    }

    #[instrument(skip_all, fields(location = %location, date = %date), level = Level::DEBUG)]
    async fn fetch_unit(
        &self,
        date: DateKey,
        location: Location,
    ) -> crate::Result<LocationDayRecord> {
        let url = location_url(self.host, location, date);
        log::info!(
            "Fetching data for {location} (location number {}) on {date} from {url}...",
            location.id()
        );
        let html = fetch_page(self.client, url).await?;
        let MenuPage { mut record, links } = MenuPage::parse(&html);

        // label pages are fetched one at a time so a unit never holds more than one connection
        for link in links {
            let url = match detail_url(self.host, &link.href) {
                Ok(url) => url,
                Err(e @ Error::Link(_)) => {
                    log::warn!("No nutrition for {} on {location} {date}: {e}", link.food);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let html = fetch_page(self.client, url).await?;
            let facts = NutritionFacts::parse(&html);
            let updated = record.apply_nutrition(&link.food, &facts);
            log::trace!("{} matched {updated} menu items", link.food);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        fetch::make_client,
        parse::{MealEntry, MealSlot, MenuItem, NOT_FOUND},
        test_support::{spawn_menu_site, BROKEN_DATE, FOREIGN_LINK_DATE},
    };

    use super::*;

    fn config(host: &Url, fail_fast: bool) -> Config {
        let host = host.to_string();
        Config::from_lookup(|key| match key {
            "MENU_HOST" => Some(host.clone()),
            "FAIL_FAST" => fail_fast.then(|| "1".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn date(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn items_named<'r>(record: &'r LocationDayRecord, food: &str) -> Vec<&'r MenuItem> {
        record.items().filter(|i| i.food == food).collect()
    }

    #[tokio::test]
    async fn test_two_dates_one_location() {
        let host = spawn_menu_site().await;
        let config = config(&host, false);
        let client = make_client();
        let dates = [date("4/5/2024"), date("4/6/2024")];
        let result = Aggregator::new(&client, &config)
            .run(&dates, &[Location::Yahentamitsi])
            .await
            .unwrap();

        assert_eq!(result.dates().collect::<Vec<_>>(), dates);
        for d in dates {
            assert_eq!(
                result.locations(d).collect::<Vec<_>>(),
                [Location::Yahentamitsi]
            );
        }
        assert_eq!(result.len(), 2);

        let weekday = result.get(dates[0], Location::Yahentamitsi).unwrap();
        let eggs = items_named(weekday, "Scrambled Eggs");
        assert_eq!(eggs.len(), 1);
        assert_eq!(eggs[0].serving_size.as_deref(), Some("1/2 cup"));
        assert_eq!(eggs[0].calories_per_serving.as_deref(), Some("190"));
        assert_eq!(
            eggs[0]
                .nutrient_information
                .as_ref()
                .unwrap()
                .get("Sodium")
                .map(String::as_str),
            Some("170mg")
        );

        let rice = items_named(weekday, "Steamed Rice");
        assert_eq!(rice.len(), 2);
        assert_eq!(rice[0], rice[1]);
        assert_eq!(rice[0].calories_per_serving.as_deref(), Some("205"));

        // the muffin's label page is blank: merged, but with placeholders
        let muffin = items_named(weekday, "Blueberry Muffin");
        assert_eq!(muffin[0].serving_size.as_deref(), Some(NOT_FOUND));
        assert_eq!(muffin[0].nutrient_information, Some(BTreeMap::new()));

        // items without a link never get nutrition
        assert!(!items_named(weekday, NOT_FOUND)[0].has_nutrition());

        let weekend = result.get(dates[1], Location::Yahentamitsi).unwrap();
        assert!(weekend.meal(MealSlot::Brunch).is_some());
        assert!(weekend.meal(MealSlot::Breakfast).is_none());
        assert_eq!(
            items_named(weekend, "Scrambled Eggs")[0].serving_size.as_deref(),
            Some("1/2 cup")
        );
    }

    #[tokio::test]
    async fn test_every_location_is_keyed_by_name() {
        let host = spawn_menu_site().await;
        let config = config(&host, false);
        let client = make_client();
        let result = Aggregator::new(&client, &config)
            .run(&[date("4/5/2024")], &Location::ALL)
            .await
            .unwrap();
        assert_eq!(
            result.locations(date("4/5/2024")).collect::<Vec<_>>(),
            Location::ALL
        );
    }

    #[tokio::test]
    async fn test_failed_unit_is_skipped() {
        let host = spawn_menu_site().await;
        let config = config(&host, false);
        let client = make_client();
        let result = Aggregator::new(&client, &config)
            .run(&[date("4/5/2024"), date(BROKEN_DATE)], &[Location::SouthCampus])
            .await
            .unwrap();
        assert_eq!(result.dates().collect::<Vec<_>>(), [date("4/5/2024")]);
    }

    #[tokio::test]
    async fn test_failed_unit_is_fatal_when_fail_fast() {
        let host = spawn_menu_site().await;
        let config = config(&host, true);
        let client = make_client();
        let err = Aggregator::new(&client, &config)
            .run(&[date("4/5/2024"), date(BROKEN_DATE)], &[Location::SouthCampus])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Request(_)), "{err}");
    }

    #[tokio::test]
    async fn test_foreign_label_link_is_not_followed() {
        let host = spawn_menu_site().await;
        let config = config(&host, true);
        let client = make_client();
        let result = Aggregator::new(&client, &config)
            .run(&[date(FOREIGN_LINK_DATE)], &[Location::North251])
            .await
            .unwrap();
        let record = result
            .get(date(FOREIGN_LINK_DATE), Location::North251)
            .unwrap();
        let stray = items_named(record, "Stray Dish");
        assert_eq!(stray.len(), 1);
        assert!(!stray[0].has_nutrition());
        // the relative link on the same page is still merged
        assert_eq!(
            items_named(record, "Scrambled Eggs")[0].serving_size.as_deref(),
            Some("1/2 cup")
        );
    }

    #[tokio::test]
    async fn test_transport_round_trip() {
        let host = spawn_menu_site().await;
        let config = config(&host, false);
        let client = make_client();
        let result = Aggregator::new(&client, &config)
            .run(&[date("4/5/2024"), date("4/6/2024")], &Location::ALL)
            .await
            .unwrap();
        let transported = result.to_transport_string().unwrap();
        assert!(transported.contains("\n    \"4/5/2024\": {"));
        assert!(transported.contains("\"South Campus\""));
        assert!(transported.contains("\"calories_per_serving\": \"190\""));
        assert_eq!(
            AggregateResult::from_transport_string(&transported).unwrap(),
            result
        );
    }

    #[test]
    fn test_transport_string_is_ascii() {
        let mut record = LocationDayRecord::default();
        record.push(
            MealSlot::Lunch,
            MealEntry {
                card_title: "Caf\u{e9} \u{1F336}".to_string(),
                menu_items: vec![MenuItem::new(
                    "Jalape\u{f1}o Poppers",
                    vec!["Spicy \"hot\"".to_string()],
                )],
            },
        );
        let mut result = AggregateResult::default();
        result.insert(date("4/5/2024"), Location::SouthCampus, record);

        let transported = result.to_transport_string().unwrap();
        assert!(transported.is_ascii());
        assert!(transported.contains(r#""food": "Jalape\u00f1o Poppers""#));
        assert!(transported.contains(r#""card_title": "Caf\u00e9 \ud83c\udf36""#));
        assert!(transported.contains(r#""Spicy \"hot\"""#));
        assert!(transported.contains("\n            \"lunch\": ["));
        assert_eq!(
            AggregateResult::from_transport_string(&transported).unwrap(),
            result
        );
    }

    #[test]
    fn test_empty_result() {
        let result = AggregateResult::default();
        assert!(result.is_empty());
        assert_eq!(result.to_transport_string().unwrap(), "{}");
        assert!(AggregateResult::from_transport_string("not json").is_err());
    }
}
