use crate::aggregate::{FleetResult, VlanView};
use comfy_table::{Cell, Table};

fn headers(hive: &str, view: &VlanView) -> [String; 2] {
    match view {
        VlanView::ByName(_) => [format!("Hive{hive} VLAN_Name"), "VLAN_Id".to_string()],
        VlanView::ById(_) => [format!("Hive{hive} VLAN_Ids"), "VLAN_Names".to_string()],
    }
}

/// Two-column table for one hive, rows in the order the view was built.
pub fn hive_table(hive: &str, view: &VlanView) -> Table {
    let mut table = Table::new();
    table.set_header(headers(hive, view).into_iter().map(Cell::new));
    for (key, values) in view.index().iter() {
        table.add_row(vec![Cell::new(key), Cell::new(values.join(","))]);
    }
    table
}

pub fn fleet_tables(fleet: &FleetResult) -> Vec<Table> {
    fleet
        .iter()
        .map(|(hive, view)| hive_table(hive, view))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SortMode;
    use crate::dump::parse_dump;

    const DUMP: &str = "\
INSERT INTO lookup VALUES ('4000','SXB1-S4Y-4000','10.213.1.25','L24.r3-2.sxb1','EX3300-48T-BF','juniper','GF0212014822','12.3R11.2');
INSERT INTO lookup VALUES ('4000','SXB1-ALT','10.213.1.26','L24.r3-3.sxb1','EX3300-48T-BF','juniper','GF0212014823','12.3R11.2');
INSERT INTO lookup VALUES ('120','MGMT','10.213.1.27','L24.r3-4.sxb1','EX3300-48T-BF','juniper','GF0212014824','12.3R11.2');
";

    fn lines(table: &Table) -> Vec<String> {
        table.lines().collect()
    }

    #[test]
    fn by_name_table_labels_hive_and_lists_ids() {
        let mut fleet = FleetResult::new(SortMode::VlanName);
        fleet.add_hive("213".into(), &parse_dump(DUMP).unwrap());

        let tables = fleet_tables(&fleet);
        assert_eq!(tables.len(), 1);
        let rendered = tables[0].to_string();
        assert!(rendered.contains("Hive213 VLAN_Name"));
        assert!(rendered.contains("VLAN_Id"));
        assert!(rendered.contains("SXB1-S4Y-4000"));
        assert!(rendered.contains("MGMT"));
    }

    #[test]
    fn by_id_table_joins_names_with_commas() {
        let mut fleet = FleetResult::new(SortMode::VlanId);
        fleet.add_hive("210".into(), &parse_dump(DUMP).unwrap());

        let table = &fleet_tables(&fleet)[0];
        let rendered = table.to_string();
        assert!(rendered.contains("Hive210 VLAN_Ids"));
        assert!(rendered.contains("VLAN_Names"));
        assert!(rendered.contains("SXB1-S4Y-4000,SXB1-ALT"));

        let rows = lines(table);
        let first = rows.iter().position(|l| l.contains("4000")).unwrap();
        let second = rows.iter().position(|l| l.contains("MGMT")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn one_table_per_hive_in_fleet_order() {
        let records = parse_dump(DUMP).unwrap();
        let mut fleet = FleetResult::new(SortMode::VlanName);
        fleet.add_hive("806".into(), &records);
        fleet.add_hive("205".into(), &records);

        let headers: Vec<String> = fleet_tables(&fleet)
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert!(headers[0].contains("Hive806"));
        assert!(headers[1].contains("Hive205"));
    }

    #[test]
    fn empty_view_still_prints_header() {
        let mut fleet = FleetResult::new(SortMode::VlanName);
        fleet.add_hive("301".into(), &[]);
        let rendered = fleet_tables(&fleet)[0].to_string();
        assert!(rendered.contains("Hive301 VLAN_Name"));
    }
}
