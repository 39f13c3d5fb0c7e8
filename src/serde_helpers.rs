use chrono::NaiveDate;
use serde::ser::Serializer;

pub fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format("%Y%m%d").to_string())
}

pub fn serialize_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

#[test]
fn test_serialize_date_and_bool() {
    #[derive(Serialize)]
    struct Test {
        #[serde(serialize_with = "serialize_date")]
        date: NaiveDate,
        #[serde(serialize_with = "serialize_bool")]
        monday: bool,
        #[serde(serialize_with = "serialize_bool")]
        sunday: bool,
    }
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(Test {
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        monday: true,
        sunday: false,
    })
    .unwrap();
    let data_out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("date,monday,sunday\n20240309,1,0\n", data_out);
}
